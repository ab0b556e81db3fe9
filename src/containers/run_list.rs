use std::slice;

/// One run of identical values.
#[derive(Debug, Clone, PartialEq)]
pub struct Run<T> {
    pub value: T,
    pub count: usize,
}

/// An ordered sequence stored run-length encoded.
///
/// Adjacent equal values pushed one after another share a run, so
/// `(int, int, int, string)` is kept as `[(int, 3), (string, 1)]`.
/// Indexing and iteration always see the expanded sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct RunList<T> {
    runs: Vec<Run<T>>,
    len: usize,
}

impl<T> Default for RunList<T> {
    fn default() -> Self {
        RunList {
            runs: Vec::new(),
            len: 0,
        }
    }
}

impl<T> RunList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements in the expanded sequence.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    pub fn runs(&self) -> &[Run<T>] {
        &self.runs
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        let mut remaining = index;
        for run in self.runs.iter() {
            if remaining < run.count {
                return Some(&run.value);
            }
            remaining -= run.count;
        }
        None
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            runs: self.runs.iter(),
            current: None,
        }
    }

    /// Mutable access to each distinct run value.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.runs.iter_mut().map(|run| &mut run.value)
    }
}

impl<T: PartialEq> RunList<T> {
    /// Appends `count` copies of `value`, merging with the last run when equal.
    pub fn push_run(&mut self, value: T, count: usize) {
        if count == 0 {
            return;
        }
        self.len += count;
        if let Some(last) = self.runs.last_mut() {
            if last.value == value {
                last.count += count;
                return;
            }
        }
        self.runs.push(Run { value, count });
    }

    pub fn push(&mut self, value: T) {
        self.push_run(value, 1);
    }
}

impl<T: PartialEq + Clone> RunList<T> {
    pub fn extend_from(&mut self, other: &RunList<T>) {
        for run in other.runs.iter() {
            self.push_run(run.value.clone(), run.count);
        }
    }
}

impl<T: PartialEq> FromIterator<T> for RunList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = RunList::new();
        for value in iter {
            list.push(value);
        }
        list
    }
}

impl<'a, T> IntoIterator for &'a RunList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the expanded sequence of a `RunList`.
pub struct Iter<'a, T> {
    runs: slice::Iter<'a, Run<T>>,
    current: Option<(&'a T, usize)>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((value, remaining)) = self.current.as_mut() {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Some(*value);
                }
            }
            let run = self.runs.next()?;
            self.current = Some((&run.value, run.count));
        }
    }
}
