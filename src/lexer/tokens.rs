use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("class", TokenKind::Class);
        map.insert("impl", TokenKind::Impl);
        map.insert("fn", TokenKind::Fn);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("while", TokenKind::While);
        map.insert("do", TokenKind::Do);
        map.insert("switch", TokenKind::Switch);
        map.insert("case", TokenKind::Case);
        map.insert("default", TokenKind::Default);
        map.insert("return", TokenKind::Return);
        map.insert("new", TokenKind::New);
        map.insert("const", TokenKind::Const);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map.insert("none", TokenKind::None);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Number,
    String,
    Identifier,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    NotEquals,  // !=
    Cast,       // =>

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Or,
    And,
    Ampersand,

    Dot,
    Ellipsis,
    Semicolon,
    Colon,
    Question,
    Comma,
    Arrow,

    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,
    PercentEquals,

    Plus,
    Dash,
    Slash,
    Star,
    Percent,

    // Reserved
    Class,
    Impl,
    Fn,
    If,
    Else,
    While,
    Do,
    Switch,
    Case,
    Default,
    Return,
    New,
    Const,
    True,
    False,
    None,
}

impl TokenKind {
    /// Operators a class may define as fields and a binary expression
    /// dispatches to.
    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Dash
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::Equals
                | TokenKind::NotEquals
                | TokenKind::Less
                | TokenKind::LessEquals
                | TokenKind::Greater
                | TokenKind::GreaterEquals
                | TokenKind::And
                | TokenKind::Or
        )
    }

    pub fn is_compound_assignment(&self) -> bool {
        matches!(
            self,
            TokenKind::PlusEquals
                | TokenKind::MinusEquals
                | TokenKind::StarEquals
                | TokenKind::SlashEquals
                | TokenKind::PercentEquals
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::String | TokenKind::Identifier | TokenKind::Number => {
                write!(f, "{} ({})", self.kind, self.value)
            }
            _ => write!(f, "{}", self.kind),
        }
    }
}
