//! Semantic type model.
//!
//! Types are a closed sum (`Type`) whose class variants refer into a
//! `ClassRegistry` arena by `ClassId`. Copying a `Type` is a deep clone of
//! everything except classes, which are shared handles: two class types are
//! the same class exactly when their ids match.
//!
//! - `types` - the `Type` enum, object/function/overload records, rendering, verification
//! - `class` - class records, the registry arena and its is-a cache
//! - `compare` - structural compatibility and type intersection
//! - `builtins` - the int/bool/double/string classes synthesized before user code

pub mod builtins;
pub mod class;
pub mod compare;
pub mod types;

pub use builtins::{BuiltinKind, Builtins};
pub use class::{ClassRegistry, ClassType};
pub use compare::{Compat, Mismatch};
pub use types::{ClassHandle, ClassId, FuncType, ObjectType, Overload, Type, VerifyError};

#[cfg(test)]
mod tests;
