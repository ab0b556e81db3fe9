#![allow(clippy::module_inception)]

use std::rc::Rc;

pub mod ast;
pub mod containers;
pub mod diagnostics;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;
pub mod types;

extern crate regex;

/// A byte offset into a named source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    pub fn null() -> Self {
        Span {
            start: Position::null(),
            end: Position::null(),
        }
    }

    /// Joins two spans into one covering both, keeping the file of `self`.
    pub fn to(&self, other: &Span) -> Span {
        Span {
            start: self.start.clone(),
            end: other.end.clone(),
        }
    }

    pub fn file(&self) -> &str {
        &self.start.1
    }
}
