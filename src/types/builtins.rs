use std::collections::HashMap;

use lazy_static::lazy_static;
use tracing::debug;

use crate::ICE;

use super::{
    class::ClassRegistry,
    types::{ClassId, FuncType, ObjectType, Overload, Type},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    Int,
    Bool,
    Double,
    String,
}

impl BuiltinKind {
    pub const ALL: [BuiltinKind; 4] = [
        BuiltinKind::Int,
        BuiltinKind::Bool,
        BuiltinKind::Double,
        BuiltinKind::String,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinKind::Int => "int",
            BuiltinKind::Bool => "bool",
            BuiltinKind::Double => "double",
            BuiltinKind::String => "string",
        }
    }

    pub fn from_name(name: &str) -> Option<BuiltinKind> {
        BUILTIN_LOOKUP.get(name).copied()
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Which operator fields a builtin class carries.
struct BuiltinShape {
    kind: BuiltinKind,
    /// `(T) -> T`
    arithmetic: &'static [&'static str],
    /// `(T) -> bool`
    relational: &'static [&'static str],
}

lazy_static! {
    static ref BUILTIN_LOOKUP: HashMap<&'static str, BuiltinKind> = {
        let mut map = HashMap::new();
        for kind in BuiltinKind::ALL {
            map.insert(kind.name(), kind);
        }
        map
    };
    static ref BUILTIN_SHAPES: Vec<BuiltinShape> = vec![
        BuiltinShape {
            kind: BuiltinKind::Int,
            arithmetic: &["+", "-", "*", "/", "%", "+=", "-=", "*=", "/=", "%="],
            relational: &["==", "<", "<=", ">", ">="],
        },
        BuiltinShape {
            kind: BuiltinKind::Bool,
            arithmetic: &[],
            relational: &["=="],
        },
        BuiltinShape {
            kind: BuiltinKind::Double,
            arithmetic: &["+", "-", "*", "/", "+=", "-=", "*=", "/="],
            relational: &["==", "<", "<=", ">", ">="],
        },
        BuiltinShape {
            kind: BuiltinKind::String,
            arithmetic: &["+", "+="],
            relational: &["=="],
        },
    ];
}

/// Ids of the four builtin classes of one compilation.
#[derive(Debug, Clone, Copy)]
pub struct Builtins {
    table: [ClassId; 4],
}

impl Builtins {
    /// Creates int, bool, double and string in `registry`.
    ///
    /// All four names are reserved before any field is built since their
    /// operators and casts refer to one another. Every builtin casts to
    /// every builtin (itself included).
    pub fn synthesize(registry: &mut ClassRegistry) -> Builtins {
        let mut table = [ClassId(0); 4];
        for kind in BuiltinKind::ALL {
            table[kind.index()] = match registry.declare(kind.name()) {
                Ok(id) => id,
                Err(_) => ICE!("builtin class `{}` declared twice", kind.name()),
            };
        }
        let builtins = Builtins { table };

        let casts = FuncType {
            overloads: BuiltinKind::ALL
                .iter()
                .map(|&target| Overload::new(vec![], builtins.object(target)))
                .collect(),
        };
        let bool_object = builtins.object(BuiltinKind::Bool);

        for shape in BUILTIN_SHAPES.iter() {
            let own = builtins.object(shape.kind);
            let class = registry.get_mut(builtins.get(shape.kind));
            for &op in shape.arithmetic {
                class
                    .fields
                    .insert(op, Type::func(vec![own.clone()], own.clone()));
            }
            for &op in shape.relational {
                class
                    .fields
                    .insert(op, Type::func(vec![own.clone()], bool_object.clone()));
            }
            class.fields.insert("=>", Type::Func(casts.clone()));
        }

        for kind in BuiltinKind::ALL {
            registry.add_comparison(builtins.get(kind));
        }
        debug!(target: "typeck::hierarchy", "synthesized builtin classes");

        builtins
    }

    pub fn get(&self, kind: BuiltinKind) -> ClassId {
        self.table[kind.index()]
    }

    pub fn object(&self, kind: BuiltinKind) -> Type {
        Type::Object(ObjectType {
            class_name: kind.name().to_string(),
            class: Some(self.get(kind)),
            generics: vec![],
        })
    }

    /// Is `ty` exactly the instance type of builtin `kind`?
    pub fn is(&self, ty: &Type, kind: BuiltinKind) -> bool {
        ty.object_class() == Some(self.get(kind))
    }
}
