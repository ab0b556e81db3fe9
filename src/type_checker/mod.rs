//! Type checking and semantic analysis module.
//!
//! The checker walks the AST once, in source order, and records the type of
//! every expression on its node. Along the way it:
//!
//! - Registers classes and computes their is-a relations
//! - Resolves calls, constructors, operators and casts to an overload
//! - Tracks definite initialization across branches and loops
//! - Checks return types of function bodies
//!
//! Errors never stop the walk: each one is recorded and checking continues
//! with the next sibling.

pub mod type_checker;
