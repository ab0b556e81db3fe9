use std::{fmt::Display, rc::Rc};

use crate::{containers::RunList, ICE};

use super::class::ClassRegistry;

/// Index of a class inside a `ClassRegistry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub(crate) usize);

impl ClassId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A class used as a value, e.g. the callee in `Foo()`.
///
/// Equality is identity: the name is carried only for rendering.
#[derive(Debug, Clone)]
pub struct ClassHandle {
    pub id: ClassId,
    pub name: Rc<str>,
}

impl PartialEq for ClassHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// An instance of a class.
///
/// Built from annotations with only `class_name` set; `Type::verify`
/// resolves the name to a class id before the type takes part in any
/// comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    pub class_name: String,
    pub class: Option<ClassId>,
    pub generics: Vec<Type>,
}

impl ObjectType {
    pub fn unresolved(class_name: impl Into<String>) -> Self {
        ObjectType {
            class_name: class_name.into(),
            class: None,
            generics: vec![],
        }
    }

    /// The resolved class. Comparing an unverified object is a checker bug.
    pub fn class_id(&self) -> ClassId {
        match self.class {
            Some(id) => id,
            None => ICE!(
                "object type `{}` used before verification",
                self.class_name
            ),
        }
    }
}

/// One call signature of a function.
#[derive(Debug, Clone, PartialEq)]
pub struct Overload {
    pub generics: Vec<String>,
    pub arguments: Vec<Type>,
    pub return_type: Type,
}

impl Overload {
    pub fn new(arguments: Vec<Type>, return_type: Type) -> Self {
        Overload {
            generics: vec![],
            arguments,
            return_type,
        }
    }
}

/// A function type: every overload sharing one name, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncType {
    pub overloads: Vec<Overload>,
}

impl FuncType {
    pub fn single(arguments: Vec<Type>, return_type: Type) -> Self {
        FuncType {
            overloads: vec![Overload::new(arguments, return_type)],
        }
    }

    /// The overload taking exactly `arguments`, if any.
    pub fn signature(&self, arguments: &[Type]) -> Option<&Overload> {
        self.overloads
            .iter()
            .find(|overload| overload.arguments == arguments)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Class(ClassHandle),
    Object(ObjectType),
    Func(FuncType),
    Array(Box<Type>),
    Tuple(RunList<Type>),
    /// The expanded element list of a tuple, destructured by definitions
    /// and call arguments.
    Spread(RunList<Type>),
    Maybe(Box<Type>),
    None,
}

/// Why an annotation could not be resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyError {
    UnknownClass(String),
    Generics(String),
}

impl Type {
    pub fn object(handle: &ClassHandle) -> Type {
        Type::Object(ObjectType {
            class_name: handle.name.to_string(),
            class: Some(handle.id),
            generics: vec![],
        })
    }

    pub fn func(arguments: Vec<Type>, return_type: Type) -> Type {
        Type::Func(FuncType::single(arguments, return_type))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Type::None)
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            Type::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<&FuncType> {
        match self {
            Type::Func(func) => Some(func),
            _ => None,
        }
    }

    /// The class of an object, once verified.
    pub fn object_class(&self) -> Option<ClassId> {
        self.as_object().and_then(|object| object.class)
    }

    /// Expands a tuple (or an existing spread) into its spread form.
    pub fn to_spread(&self) -> Option<Type> {
        match self {
            Type::Tuple(elements) | Type::Spread(elements) => Some(Type::Spread(elements.clone())),
            _ => None,
        }
    }

    /// Resolves every object class name against `registry`.
    pub fn verify(&mut self, registry: &ClassRegistry) -> Result<(), VerifyError> {
        match self {
            Type::Object(object) => {
                if !object.generics.is_empty() {
                    return Err(VerifyError::Generics(object.class_name.clone()));
                }
                match registry.lookup(&object.class_name) {
                    Some(id) => {
                        object.class = Some(id);
                        Ok(())
                    }
                    None => Err(VerifyError::UnknownClass(object.class_name.clone())),
                }
            }
            Type::Func(func) => {
                for overload in func.overloads.iter_mut() {
                    if let Some(generic) = overload.generics.first() {
                        return Err(VerifyError::Generics(generic.clone()));
                    }
                    for argument in overload.arguments.iter_mut() {
                        argument.verify(registry)?;
                    }
                    overload.return_type.verify(registry)?;
                }
                Ok(())
            }
            Type::Array(inner) | Type::Maybe(inner) => inner.verify(registry),
            Type::Tuple(elements) | Type::Spread(elements) => {
                for element in elements.values_mut() {
                    element.verify(registry)?;
                }
                Ok(())
            }
            Type::Class(_) | Type::None => Ok(()),
        }
    }
}

fn write_list(f: &mut std::fmt::Formatter<'_>, types: &[&Type]) -> std::fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", ty)?;
    }
    Ok(())
}

impl Display for Overload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.generics.is_empty() {
            write!(f, "<{}>", self.generics.join(", "))?;
        }
        write!(f, "(")?;
        write_list(f, &self.arguments.iter().collect::<Vec<_>>())?;
        write!(f, ") -> {}", self.return_type)
    }
}

impl Display for FuncType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, overload) in self.overloads.iter().enumerate() {
            if i > 0 {
                write!(f, " & ")?;
            }
            write!(f, "{}", overload)?;
        }
        Ok(())
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Class(handle) => write!(f, "class {}", handle.name),
            Type::Object(object) => {
                write!(f, "{}", object.class_name)?;
                if !object.generics.is_empty() {
                    write!(f, "<")?;
                    write_list(f, &object.generics.iter().collect::<Vec<_>>())?;
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::Func(func) => write!(f, "{}", func),
            Type::Array(inner) => write!(f, "{}[]", inner),
            Type::Tuple(elements) => {
                write!(f, "(")?;
                write_list(f, &elements.iter().collect::<Vec<_>>())?;
                if elements.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Type::Spread(elements) => {
                write!(f, "...(")?;
                write_list(f, &elements.iter().collect::<Vec<_>>())?;
                write!(f, ")")
            }
            Type::Maybe(inner) => write!(f, "{}?", inner),
            Type::None => write!(f, "none"),
        }
    }
}
