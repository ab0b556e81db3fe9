use super::{
    class::ClassRegistry,
    types::{ClassId, FuncType, Overload, Type},
};

/// Why a value of one type cannot be used where another is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    Incompatible,
    /// The comparison is structurally meaningful but not implemented; the
    /// payload names the feature for the diagnostic.
    Unsupported(&'static str),
}

/// `Ok` when the actual type satisfies the expected one.
pub type Compat = Result<(), Mismatch>;

impl ClassRegistry {
    /// Does a value of type `actual` satisfy a use site expecting `expected`?
    pub fn compare(&self, actual: &Type, expected: &Type) -> Compat {
        match (actual, expected) {
            (Type::Object(actual), Type::Object(expected)) => {
                if self.is_a(actual.class_id(), expected.class_id()) {
                    Ok(())
                } else {
                    Err(Mismatch::Incompatible)
                }
            }
            (Type::Class(actual), Type::Class(expected)) => {
                self.class_satisfies(actual.id, expected.id)
            }
            (Type::Func(actual), Type::Func(expected)) => self.func_satisfies(actual, expected),
            (Type::Array(actual), Type::Array(expected))
            | (Type::Maybe(actual), Type::Maybe(expected)) => {
                // invariant in the element type
                self.compare(actual, expected)?;
                self.compare(expected, actual)
            }
            (Type::Tuple(_) | Type::Spread(_), Type::Tuple(_) | Type::Spread(_)) => {
                Err(Mismatch::Unsupported("Tuple comparisons"))
            }
            (Type::None, Type::None) => Ok(()),
            _ => Err(Mismatch::Incompatible),
        }
    }

    /// Width and depth subtyping over field maps.
    pub(crate) fn class_satisfies(&self, actual: ClassId, expected: ClassId) -> Compat {
        if actual == expected {
            return Ok(());
        }
        let actual = self.get(actual);
        for (name, expected_field) in self.get(expected).fields.iter() {
            match actual.field(name) {
                Some(actual_field) => self.compare(actual_field, expected_field)?,
                None => return Err(Mismatch::Incompatible),
            }
        }
        Ok(())
    }

    /// Every expected overload must be met by some actual overload.
    fn func_satisfies(&self, actual: &FuncType, expected: &FuncType) -> Compat {
        'expected: for wanted in expected.overloads.iter() {
            for candidate in actual.overloads.iter() {
                match self.overload_satisfies(candidate, wanted) {
                    Ok(()) => continue 'expected,
                    Err(Mismatch::Incompatible) => {}
                    Err(unsupported) => return Err(unsupported),
                }
            }
            return Err(Mismatch::Incompatible);
        }
        Ok(())
    }

    fn overload_satisfies(&self, actual: &Overload, expected: &Overload) -> Compat {
        if !actual.generics.is_empty() || !expected.generics.is_empty() {
            return Err(Mismatch::Unsupported("Generic functions"));
        }
        if actual.arguments.len() != expected.arguments.len() {
            return Err(Mismatch::Incompatible);
        }
        for (accepted, passed) in actual.arguments.iter().zip(expected.arguments.iter()) {
            self.compare(passed, accepted)?;
        }
        self.compare(&actual.return_type, &expected.return_type)
    }

    /// The narrowest type both `a` and `b` satisfy.
    ///
    /// If one side already satisfies the other the wider one wins. Two
    /// unrelated objects meet at their most specific common registered
    /// class.
    pub fn intersect(&self, a: &Type, b: &Type) -> Result<Type, Mismatch> {
        match self.compare(a, b) {
            Ok(()) => return Ok(b.clone()),
            Err(Mismatch::Unsupported(feature)) => return Err(Mismatch::Unsupported(feature)),
            Err(Mismatch::Incompatible) => {}
        }
        if self.compare(b, a).is_ok() {
            return Ok(a.clone());
        }

        match (a, b) {
            (Type::Object(left), Type::Object(right)) => {
                let common: Vec<ClassId> = self
                    .supertypes(left.class_id())
                    .into_iter()
                    .filter(|&class| self.is_a(right.class_id(), class))
                    .collect();
                common
                    .iter()
                    .copied()
                    .find(|&candidate| common.iter().all(|&other| self.is_a(candidate, other)))
                    .map(|class| self.object(class))
                    .ok_or(Mismatch::Incompatible)
            }
            _ => Err(Mismatch::Incompatible),
        }
    }
}
