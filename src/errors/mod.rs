//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout the front end and
//! the type checker. It includes:
//!
//! - Error structures with source span and severity information
//! - Specific error variants for the lexer, parser and checker
//! - Error names and tips used by the diagnostic renderer

pub mod errors;

#[cfg(test)]
mod tests;
