//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords and identifiers
//! - Numeric literals (integers and doubles)
//! - String literals with escape sequences
//! - Operators whose spellings share a prefix
//! - Comments and spans
//! - Error cases

use super::{lexer::tokenize, tokens::TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source.to_string(), Some("test.sp".to_string()))
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    assert_eq!(
        kinds("class impl fn if else while do switch case default return new const true false none"),
        vec![
            TokenKind::Class,
            TokenKind::Impl,
            TokenKind::Fn,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::Do,
            TokenKind::Switch,
            TokenKind::Case,
            TokenKind::Default,
            TokenKind::Return,
            TokenKind::New,
            TokenKind::Const,
            TokenKind::True,
            TokenKind::False,
            TokenKind::None,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_identifiers() {
    let tokens = tokenize("foo baz_123 _ CamelCase classy".to_string(), None).unwrap();

    let values: Vec<&str> = tokens.iter().map(|token| token.value.as_str()).collect();
    assert_eq!(values, vec!["foo", "baz_123", "_", "CamelCase", "classy", "EOF"]);
    assert!(tokens[..5].iter().all(|token| token.kind == TokenKind::Identifier));
}

#[test]
fn test_tokenize_numbers() {
    let tokens = tokenize("42 3.14 0 100.5".to_string(), None).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[2].value, "0");
    assert_eq!(tokens[3].value, "100.5");
    assert_eq!(tokens[4].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_strings() {
    let tokens = tokenize(r#""hello" "=>" "multiple words" """#.to_string(), None).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "hello");
    assert_eq!(tokens[1].value, "=>");
    assert_eq!(tokens[2].value, "multiple words");
    assert_eq!(tokens[3].value, "");
    assert_eq!(tokens[4].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_string_escapes() {
    let tokens = tokenize(
        r#""hello\nworld" "tab\there" "backslash\\" "hex\x41" "quote\"test""#.to_string(),
        None,
    )
    .unwrap();

    assert_eq!(tokens[0].value, "hello\nworld");
    assert_eq!(tokens[1].value, "tab\there");
    assert_eq!(tokens[2].value, "backslash\\");
    assert_eq!(tokens[3].value, "hexA");
    assert_eq!(tokens[4].value, "quote\"test");
    assert_eq!(tokens[5].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_string_span_covers_quotes() {
    let tokens = tokenize(r#"x = "ab""#.to_string(), None).unwrap();

    assert_eq!(tokens[2].span.start.0, 4);
    assert_eq!(tokens[2].span.end.0, 8);
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("+ - * / % == != < > <= >= = && || => &"),
        vec![
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Equals,
            TokenKind::NotEquals,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::LessEquals,
            TokenKind::GreaterEquals,
            TokenKind::Assignment,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Cast,
            TokenKind::Ampersand,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_compound_operators() {
    assert_eq!(
        kinds("+= -= *= /= %="),
        vec![
            TokenKind::PlusEquals,
            TokenKind::MinusEquals,
            TokenKind::StarEquals,
            TokenKind::SlashEquals,
            TokenKind::PercentEquals,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_prefix_sharing_without_spaces() {
    assert_eq!(
        kinds("a=>int b==c d=e ...f g.h i->j"),
        vec![
            TokenKind::Identifier,
            TokenKind::Cast,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Equals,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Assignment,
            TokenKind::Identifier,
            TokenKind::Ellipsis,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Dot,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Arrow,
            TokenKind::Identifier,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_punctuation() {
    assert_eq!(
        kinds("( ) { } [ ] . , ; : ? -> ..."),
        vec![
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenCurly,
            TokenKind::CloseCurly,
            TokenKind::OpenBracket,
            TokenKind::CloseBracket,
            TokenKind::Dot,
            TokenKind::Comma,
            TokenKind::Semicolon,
            TokenKind::Colon,
            TokenKind::Question,
            TokenKind::Arrow,
            TokenKind::Ellipsis,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_comments() {
    let tokens = tokenize("x = 5 // a comment\ny = 10 //".to_string(), None).unwrap();

    let values: Vec<&str> = tokens.iter().map(|token| token.value.as_str()).collect();
    assert_eq!(values, vec!["x", "=", "5", "y", "=", "10", "EOF"]);
}

#[test]
fn test_tokenize_spans_and_file() {
    let tokens = tokenize("foo\n  bar".to_string(), Some("main.sp".to_string())).unwrap();

    assert_eq!(tokens[0].span.start.0, 0);
    assert_eq!(tokens[0].span.end.0, 3);
    assert_eq!(tokens[1].span.start.0, 6);
    assert_eq!(tokens[1].span.end.0, 9);
    assert_eq!(*tokens[1].span.start.1, "main.sp");
    assert_eq!(tokens[2].span.start.0, 9);
}

#[test]
fn test_tokenize_class_declaration() {
    assert_eq!(
        kinds("class Foo { x, y: int \"=>\": () -> bool new(int) }"),
        vec![
            TokenKind::Class,
            TokenKind::Identifier,
            TokenKind::OpenCurly,
            TokenKind::Identifier,
            TokenKind::Comma,
            TokenKind::Identifier,
            TokenKind::Colon,
            TokenKind::Identifier,
            TokenKind::String,
            TokenKind::Colon,
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::Arrow,
            TokenKind::Identifier,
            TokenKind::New,
            TokenKind::OpenParen,
            TokenKind::Identifier,
            TokenKind::CloseParen,
            TokenKind::CloseCurly,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_unrecognized_token() {
    let result = tokenize("x = @".to_string(), Some("test.sp".to_string()));

    let error = result.unwrap_err();
    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_position().0, 4);
}

#[test]
fn test_tokenize_unterminated_string() {
    assert!(tokenize("\"open".to_string(), None).is_err());
}

#[test]
fn test_tokenize_default_file_name() {
    let tokens = tokenize("x".to_string(), None).unwrap();
    assert_eq!(tokens[0].span.file(), "shell");
}
