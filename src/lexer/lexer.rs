use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex);

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

macro_rules! pattern {
    ($regex:literal, $handler:expr) => {
        RegexPattern {
            regex: Regex::new(concat!("^", $regex)).unwrap(),
            handler: $handler,
        }
    };
}

lazy_static! {
    // Tried in order, first match wins: longer operators precede their prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern!("[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
        pattern!("[0-9]+(\\.[0-9]+)?", number_handler),
        pattern!("\\s+", skip_handler),
        pattern!("\"(\\\\.|[^\"\\\\])*\"", string_handler),
        pattern!("//[^\n]*", skip_handler),
        pattern!("\\[", MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[")),
        pattern!("\\]", MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]")),
        pattern!("\\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{")),
        pattern!("\\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}")),
        pattern!("\\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
        pattern!("\\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
        pattern!("=>", MK_DEFAULT_HANDLER!(TokenKind::Cast, "=>")),
        pattern!("==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        pattern!("!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
        pattern!("=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
        pattern!("<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
        pattern!("<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        pattern!(">=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        pattern!(">", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        pattern!("\\|\\|", MK_DEFAULT_HANDLER!(TokenKind::Or, "||")),
        pattern!("&&", MK_DEFAULT_HANDLER!(TokenKind::And, "&&")),
        pattern!("&", MK_DEFAULT_HANDLER!(TokenKind::Ampersand, "&")),
        pattern!("\\.\\.\\.", MK_DEFAULT_HANDLER!(TokenKind::Ellipsis, "...")),
        pattern!("\\.", MK_DEFAULT_HANDLER!(TokenKind::Dot, ".")),
        pattern!(";", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
        pattern!(":", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
        pattern!("\\?", MK_DEFAULT_HANDLER!(TokenKind::Question, "?")),
        pattern!(",", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        pattern!("->", MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->")),
        pattern!("\\+=", MK_DEFAULT_HANDLER!(TokenKind::PlusEquals, "+=")),
        pattern!("-=", MK_DEFAULT_HANDLER!(TokenKind::MinusEquals, "-=")),
        pattern!("\\*=", MK_DEFAULT_HANDLER!(TokenKind::StarEquals, "*=")),
        pattern!("/=", MK_DEFAULT_HANDLER!(TokenKind::SlashEquals, "/=")),
        pattern!("%=", MK_DEFAULT_HANDLER!(TokenKind::PercentEquals, "%=")),
        pattern!("\\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        pattern!("-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        pattern!("/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        pattern!("\\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
        pattern!("%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            pos: 0,
            tokens: vec![],
            source,
            file: file_name,
        }
    }

    pub fn position(&self) -> Position {
        Position(self.pos as u32, Rc::clone(&self.file))
    }

    /// Span of the next `len` bytes.
    pub fn span_of(&self, len: usize) -> Span {
        Span::new(
            self.position(),
            Position((self.pos + len) as u32, Rc::clone(&self.file)),
        )
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn at(&self) -> char {
        self.remainder().chars().next().unwrap_or('\0')
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn matched(&self, regex: &Regex) -> usize {
        regex.find(self.remainder()).map_or(0, |m| m.end())
    }
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) {
    let len = lexer.matched(regex);
    let matched = lexer.remainder()[..len].to_string();

    let span = lexer.span_of(len);
    lexer.push(MK_TOKEN!(TokenKind::Number, matched, span));
    lexer.advance_n(len);
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) {
    let len = lexer.matched(regex);
    lexer.advance_n(len);
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) {
    let len = lexer.matched(regex);
    let literal = &lexer.remainder()[1..len - 1];

    let mut result = String::new();
    let mut chars = literal.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.peek() {
            Some('n') => {
                result.push('\n');
                chars.next();
            }
            Some('t') => {
                result.push('\t');
                chars.next();
            }
            Some('r') => {
                result.push('\r');
                chars.next();
            }
            Some('0') => {
                result.push('\0');
                chars.next();
            }
            Some('\\') => {
                result.push('\\');
                chars.next();
            }
            Some('"') => {
                result.push('"');
                chars.next();
            }
            Some('x') => {
                chars.next();
                let mut hex = String::new();
                while hex.len() < 2 {
                    match chars.peek() {
                        Some(digit) if digit.is_ascii_hexdigit() => {
                            hex.push(*digit);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) => result.push(byte as char),
                    Err(_) => {
                        result.push_str("\\x");
                        result.push_str(&hex);
                    }
                }
            }
            // unknown escapes keep their backslash
            _ => result.push(ch),
        }
    }

    let span = lexer.span_of(len);
    lexer.push(MK_TOKEN!(TokenKind::String, result, span));
    lexer.advance_n(len);
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) {
    let len = lexer.matched(regex);
    let value = lexer.remainder()[..len].to_string();
    let span = lexer.span_of(len);

    let kind = RESERVED_LOOKUP
        .get(value.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);
    lexer.push(MK_TOKEN!(kind, value, span));
    lexer.advance_n(len);
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let pattern = PATTERNS
            .iter()
            .find(|pattern| pattern.regex.is_match(lex.remainder()));

        match pattern {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex),
            None => {
                return Err(Error::at(
                    ErrorImpl::UnrecognisedToken {
                        token: lex.at().to_string(),
                    },
                    lex.position(),
                ));
            }
        }
    }

    let span = lex.span_of(0);
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), span));
    trace!(target: "lexer", file = %lex.file, tokens = lex.tokens.len(), "tokenized");
    Ok(lex.tokens)
}
