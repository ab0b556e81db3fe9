//! Type parsing implementation.
//!
//! This module handles parsing of type annotations. It supports:
//!
//! - Named types with optional generic arguments
//! - `none`
//! - Tuple and function types
//! - Array and maybe suffixes
//! - Overload sets joined with `&`
//!
//! Similar to expression parsing, it uses NUD/LED handlers with
//! binding powers for parsing complex type expressions.

use std::collections::HashMap;

use crate::{ast::types::TypeExpr, errors::errors::Error, lexer::tokens::TokenKind};

use super::{lookups::BindingPower, parser::Parser};

pub type TypeNUDHandler = fn(&mut Parser) -> Result<TypeExpr, Error>;
pub type TypeLEDHandler = fn(&mut Parser, TypeExpr, BindingPower) -> Result<TypeExpr, Error>;

pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;
pub type TypeLEDLookup = HashMap<TokenKind, TypeLEDHandler>;
pub type TypeBPLookup = HashMap<TokenKind, BindingPower>;

pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_named_type);
    parser.type_nud(TokenKind::None, parse_none_type);
    parser.type_nud(TokenKind::OpenParen, parse_paren_type);

    parser.type_led(TokenKind::OpenBracket, BindingPower::Call, parse_array_type);
    parser.type_led(TokenKind::Question, BindingPower::Call, parse_maybe_type);
    parser.type_led(TokenKind::Ampersand, BindingPower::Logical, parse_overload_type);
}

/// `Foo` or `Foo<int, string>`
pub fn parse_named_type(parser: &mut Parser) -> Result<TypeExpr, Error> {
    let token = parser.expect(TokenKind::Identifier)?;

    let mut generics = vec![];
    if parser.eat(TokenKind::Less) {
        loop {
            generics.push(parse_type(parser, BindingPower::Default)?);
            if !parser.eat(TokenKind::Comma) {
                break;
            }
        }
        parser.expect(TokenKind::Greater)?;
    }

    Ok(TypeExpr::Named {
        name: token.value,
        generics,
        span: parser.span_from(&token.span.start),
    })
}

pub fn parse_none_type(parser: &mut Parser) -> Result<TypeExpr, Error> {
    let token = parser.expect(TokenKind::None)?;
    Ok(TypeExpr::None(token.span))
}

/// `(int)`, `(int, string)`, `()` or a function type when `->` follows.
pub fn parse_paren_type(parser: &mut Parser) -> Result<TypeExpr, Error> {
    let start = parser.expect(TokenKind::OpenParen)?.span.start;

    let mut elements = vec![];
    let mut trailing_comma = false;
    while parser.current_token_kind() != TokenKind::CloseParen {
        elements.push(parse_type(parser, BindingPower::Default)?);
        trailing_comma = parser.eat(TokenKind::Comma);
        if !trailing_comma {
            break;
        }
    }
    parser.expect(TokenKind::CloseParen)?;

    if parser.eat(TokenKind::Arrow) {
        // `&` binds looser than the return type, so it joins whole signatures
        let return_type = parse_type(parser, BindingPower::Logical)?;
        return Ok(TypeExpr::Function {
            arguments: elements,
            return_type: Box::new(return_type),
            span: parser.span_from(&start),
        });
    }

    if elements.len() == 1 && !trailing_comma {
        if let Some(inner) = elements.pop() {
            return Ok(inner);
        }
    }
    Ok(TypeExpr::Tuple(elements, parser.span_from(&start)))
}

pub fn parse_array_type(
    parser: &mut Parser,
    left: TypeExpr,
    _bp: BindingPower,
) -> Result<TypeExpr, Error> {
    parser.expect(TokenKind::OpenBracket)?;
    parser.expect(TokenKind::CloseBracket)?;

    let span = parser.span_from(&left.get_span().start);
    Ok(TypeExpr::Array(Box::new(left), span))
}

pub fn parse_maybe_type(
    parser: &mut Parser,
    left: TypeExpr,
    _bp: BindingPower,
) -> Result<TypeExpr, Error> {
    parser.expect(TokenKind::Question)?;

    let span = parser.span_from(&left.get_span().start);
    Ok(TypeExpr::Maybe(Box::new(left), span))
}

/// `(int) -> int & (string) -> int`
pub fn parse_overload_type(
    parser: &mut Parser,
    left: TypeExpr,
    bp: BindingPower,
) -> Result<TypeExpr, Error> {
    if !left.is_function() {
        return Err(parser.unexpected_detailed("only function types can be overloaded"));
    }
    parser.expect(TokenKind::Ampersand)?;

    let right = parse_type(parser, bp)?;
    if !right.is_function() {
        return Err(parser.unexpected_detailed("only function types can be overloaded"));
    }

    let span = parser.span_from(&left.get_span().start);
    let mut members = vec![];
    for side in [left, right] {
        match side {
            TypeExpr::Overloads(inner, _) => members.extend(inner),
            function => members.push(function),
        }
    }
    Ok(TypeExpr::Overloads(members, span))
}

pub fn parse_type(parser: &mut Parser, bp: BindingPower) -> Result<TypeExpr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_type_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected());
    };
    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let Some(next_bp) = parser.get_type_bp_lookup().get(&token_kind).copied() else {
            break;
        };
        if next_bp <= bp {
            break;
        }
        let Some(led) = parser.get_type_led_lookup().get(&token_kind).copied() else {
            return Err(parser.unexpected());
        };
        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}
