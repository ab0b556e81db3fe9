use std::collections::{btree_map, BTreeMap};

/// A map from names to values with iteration ordered by the bytes of the key.
///
/// `String` orders lexicographically by UTF-8 bytes, so every listing of a
/// symbol table or field map is deterministic regardless of insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolMap<V> {
    entries: BTreeMap<String, V>,
}

impl<V> Default for SymbolMap<V> {
    fn default() -> Self {
        SymbolMap {
            entries: BTreeMap::new(),
        }
    }
}

impl<V> SymbolMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        self.entries.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<V> {
        self.entries.remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, V> {
        self.entries.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, V> {
        self.entries.keys()
    }

    pub fn values(&self) -> btree_map::Values<'_, String, V> {
        self.entries.values()
    }
}

impl<V> FromIterator<(String, V)> for SymbolMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        SymbolMap {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a, V> IntoIterator for &'a SymbolMap<V> {
    type Item = (&'a String, &'a V);
    type IntoIter = btree_map::Iter<'a, String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
