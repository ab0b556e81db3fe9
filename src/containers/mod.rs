//! Container utilities shared by the type model and the checker.
//!
//! - `RunList` - an ordered sequence stored as (value, repeat count) runs,
//!   used for tuple and spread element lists
//! - `SymbolMap` - a name-keyed map that iterates in byte order of its keys,
//!   used for symbol tables and class field maps

pub mod run_list;
pub mod symbol_map;

pub use run_list::{Run, RunList};
pub use symbol_map::SymbolMap;
