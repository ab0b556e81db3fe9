use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};

use tracing::debug;

use crate::{containers::SymbolMap, ICE};

use super::types::{ClassHandle, ClassId, Type};

/// A class declaration as the checker sees it.
///
/// Operators and casts are ordinary fields under symbolic names such as
/// `"+"`, `"=="` and `"=>"`.
#[derive(Debug, Clone)]
pub struct ClassType {
    pub name: String,
    pub generics: Vec<String>,
    pub supers: Vec<String>,
    pub constructors: Vec<Vec<Type>>,
    pub fields: SymbolMap<Type>,
}

impl ClassType {
    pub fn new(name: impl Into<String>) -> Self {
        ClassType {
            name: name.into(),
            generics: vec![],
            supers: vec![],
            constructors: vec![],
            fields: SymbolMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Type> {
        self.fields.get(name)
    }
}

/// Owns every class of a compilation and memoizes structural is-a answers.
///
/// Classes live in an arena and are referred to by `ClassId`, so a class is
/// never copied: every `Type::Class`/`Type::Object` naming it points at the
/// same record.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: Vec<ClassType>,
    names: SymbolMap<ClassId>,
    registered: Vec<ClassId>,
    is_a: HashMap<ClassId, HashSet<ClassId>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a class under `name`. Returns the existing id if the name is
    /// already taken.
    pub fn declare(&mut self, name: &str) -> Result<ClassId, ClassId> {
        if let Some(existing) = self.names.get(name) {
            return Err(*existing);
        }
        let id = ClassId(self.classes.len());
        self.classes.push(ClassType::new(name));
        self.names.insert(name, id);
        Ok(id)
    }

    pub fn get(&self, id: ClassId) -> &ClassType {
        match self.classes.get(id.0) {
            Some(class) => class,
            None => ICE!("class id {} out of range", id.0),
        }
    }

    pub fn get_mut(&mut self, id: ClassId) -> &mut ClassType {
        match self.classes.get_mut(id.0) {
            Some(class) => class,
            None => ICE!("class id {} out of range", id.0),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        self.names.get(name).copied()
    }

    pub fn handle(&self, id: ClassId) -> ClassHandle {
        ClassHandle {
            id,
            name: Rc::from(self.get(id).name.as_str()),
        }
    }

    /// The instance type of class `id`.
    pub fn object(&self, id: ClassId) -> Type {
        Type::object(&self.handle(id))
    }

    pub fn names(&self) -> &SymbolMap<ClassId> {
        &self.names
    }

    /// Classes whose hierarchy has been computed, in registration order.
    pub fn registered(&self) -> &[ClassId] {
        &self.registered
    }

    pub fn is_registered(&self, id: ClassId) -> bool {
        self.is_a.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Adds `id` to the hierarchy cache.
    ///
    /// Every previously registered class is compared structurally in both
    /// directions and the answers stored. The class must be fully built:
    /// fields added afterwards are not seen by the cache.
    pub fn add_comparison(&mut self, id: ClassId) {
        if self.is_registered(id) {
            ICE!("class `{}` registered twice", self.get(id).name);
        }

        let mut supers = vec![id];
        let mut subs = vec![];
        for &other in self.registered.iter() {
            if self.class_satisfies(id, other).is_ok() {
                supers.push(other);
            }
            if self.class_satisfies(other, id).is_ok() {
                subs.push(other);
            }
        }

        debug!(
            target: "typeck::hierarchy",
            class = %self.get(id).name,
            supers = supers.len() - 1,
            subs = subs.len(),
            "registered class"
        );

        self.is_a.insert(id, supers.into_iter().collect());
        for sub in subs {
            self.is_a.entry(sub).or_default().insert(id);
        }
        self.registered.push(id);
    }

    /// Cached answer to "does an instance of `class` satisfy `expected`".
    pub fn is_a(&self, class: ClassId, expected: ClassId) -> bool {
        class == expected
            || self
                .is_a
                .get(&class)
                .is_some_and(|supers| supers.contains(&expected))
    }

    /// Registered classes that `class` satisfies, in registration order.
    pub fn supertypes(&self, class: ClassId) -> Vec<ClassId> {
        self.registered
            .iter()
            .copied()
            .filter(|&other| self.is_a(class, other))
            .collect()
    }
}
