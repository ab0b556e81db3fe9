//! Type annotations as written in source.
//!
//! Annotations are syntax only: `TypeExpr::to_type` lowers them to an
//! unresolved `Type` whose object names are then verified against the class
//! registry by the checker.

use std::fmt::Display;

use crate::{
    containers::RunList,
    types::{FuncType, ObjectType, Overload, Type},
    Span, ICE,
};

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// `Foo` or `Foo<int>`
    Named {
        name: String,
        generics: Vec<TypeExpr>,
        span: Span,
    },
    /// `none`
    None(Span),
    /// `(int, string)`
    Tuple(Vec<TypeExpr>, Span),
    /// `(int, int) -> int`
    Function {
        arguments: Vec<TypeExpr>,
        return_type: Box<TypeExpr>,
        span: Span,
    },
    /// `(int) -> int & (string) -> int`
    Overloads(Vec<TypeExpr>, Span),
    /// `int[]`
    Array(Box<TypeExpr>, Span),
    /// `int?`
    Maybe(Box<TypeExpr>, Span),
}

impl TypeExpr {
    pub fn get_span(&self) -> &Span {
        match self {
            TypeExpr::Named { span, .. }
            | TypeExpr::None(span)
            | TypeExpr::Tuple(_, span)
            | TypeExpr::Function { span, .. }
            | TypeExpr::Overloads(_, span)
            | TypeExpr::Array(_, span)
            | TypeExpr::Maybe(_, span) => span,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, TypeExpr::Function { .. } | TypeExpr::Overloads(..))
    }

    /// Lowers the annotation. Object types come out unresolved.
    pub fn to_type(&self) -> Type {
        match self {
            TypeExpr::Named { name, generics, .. } => Type::Object(ObjectType {
                class_name: name.clone(),
                class: None,
                generics: generics.iter().map(TypeExpr::to_type).collect(),
            }),
            TypeExpr::None(_) => Type::None,
            TypeExpr::Tuple(elements, _) => {
                Type::Tuple(elements.iter().map(TypeExpr::to_type).collect::<RunList<Type>>())
            }
            TypeExpr::Function {
                arguments,
                return_type,
                ..
            } => Type::Func(FuncType {
                overloads: vec![Overload::new(
                    arguments.iter().map(TypeExpr::to_type).collect(),
                    return_type.to_type(),
                )],
            }),
            TypeExpr::Overloads(members, _) => {
                let mut overloads = vec![];
                for member in members {
                    match member.to_type() {
                        Type::Func(func) => overloads.extend(func.overloads),
                        other => ICE!("overload set member `{}` is not a function", other),
                    }
                }
                Type::Func(FuncType { overloads })
            }
            TypeExpr::Array(inner, _) => Type::Array(Box::new(inner.to_type())),
            TypeExpr::Maybe(inner, _) => Type::Maybe(Box::new(inner.to_type())),
        }
    }
}

impl Display for TypeExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_type())
    }
}
