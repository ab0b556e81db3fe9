use crate::{
    ast::{
        ast::{Expr, ExprWrapper},
        expressions::{
            ArrayExpr, BinaryExpr, CallExpr, CastExpr, FunctionExpr, IndexExpr, InitExpr, Literal,
            LiteralExpr, MemberExpr, Parameter, SpreadExpr, SymbolExpr, TupleExpr,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    lookups::BindingPower,
    parser::Parser,
    stmt::parse_block,
    types::parse_type,
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<ExprWrapper, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected());
    };
    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let Some(next_bp) = parser.get_bp_lookup().get(&token_kind).copied() else {
            break;
        };
        if next_bp <= bp {
            break;
        }
        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            return Err(parser.unexpected());
        };
        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}

/// Parses `expr (, expr)*` up to `close`, allowing a trailing comma.
fn parse_expr_list(parser: &mut Parser, close: TokenKind) -> Result<Vec<ExprWrapper>, Error> {
    let mut elements = vec![];
    while parser.current_token_kind() != close {
        elements.push(parse_expr(parser, BindingPower::Default)?);
        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }
    parser.expect(close)?;
    Ok(elements)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let token = parser.advance();
    let value = match token.kind {
        TokenKind::Number => {
            let parsed = if token.value.contains('.') {
                token.value.parse().map(Literal::Double).ok()
            } else {
                token.value.parse().map(Literal::Int).ok()
            };
            match parsed {
                Some(literal) => literal,
                None => {
                    return Err(Error::new(
                        ErrorImpl::NumberParseError {
                            token: token.value.clone(),
                        },
                        token.span.clone(),
                    ))
                }
            }
        }
        TokenKind::Identifier => {
            return Ok(ExprWrapper::new(SymbolExpr {
                name: token.value,
                span: token.span,
                ty: None,
            }))
        }
        TokenKind::String => Literal::String(token.value.clone()),
        TokenKind::True => Literal::Bool(true),
        TokenKind::False => Literal::Bool(false),
        TokenKind::None => Literal::None,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.span,
            ))
        }
    };

    Ok(ExprWrapper::new(LiteralExpr {
        value,
        span: token.span,
        ty: None,
    }))
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    let operator = parser.advance();
    let right = parse_expr(parser, bp)?;

    Ok(ExprWrapper::new(BinaryExpr {
        span: left.get_span().to(right.get_span()),
        left,
        operator,
        right,
        overload: None,
        ty: None,
    }))
}

/// `x += value`, only on plain variables.
pub fn parse_compound_assignment_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    if left.downcast_ref::<SymbolExpr>().is_none() {
        return Err(parser.unexpected_detailed("only variables can be assigned to"));
    }
    parse_binary_expr(parser, left, bp)
}

/// `value => type`
pub fn parse_cast_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    parser.expect(TokenKind::Cast)?;
    let target = parse_type(parser, bp)?;

    Ok(ExprWrapper::new(CastExpr {
        span: left.get_span().to(target.get_span()),
        value: left,
        target,
        overload: None,
        ty: None,
    }))
}

/// `(e)` groups, `()`, `(e,)` and `(e, f)` build tuples.
pub fn parse_grouping_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.expect(TokenKind::OpenParen)?.span.start;

    let mut elements = vec![];
    let mut trailing_comma = false;
    while parser.current_token_kind() != TokenKind::CloseParen {
        elements.push(parse_expr(parser, BindingPower::Default)?);
        trailing_comma = parser.eat(TokenKind::Comma);
        if !trailing_comma {
            break;
        }
    }
    parser.expect(TokenKind::CloseParen)?;

    if elements.len() == 1 && !trailing_comma {
        if let Some(inner) = elements.pop() {
            return Ok(inner);
        }
    }
    Ok(ExprWrapper::new(TupleExpr {
        elements,
        span: parser.span_from(&start),
        ty: None,
    }))
}

pub fn parse_array_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.expect(TokenKind::OpenBracket)?.span.start;
    let elements = parse_expr_list(parser, TokenKind::CloseBracket)?;

    Ok(ExprWrapper::new(ArrayExpr {
        elements,
        span: parser.span_from(&start),
        ty: None,
    }))
}

pub fn parse_spread_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.expect(TokenKind::Ellipsis)?.span.start;
    let value = parse_expr(parser, BindingPower::Unary)?;

    Ok(ExprWrapper::new(SpreadExpr {
        span: parser.span_from(&start),
        value,
        ty: None,
    }))
}

pub fn parse_call_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    _bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let arguments = parse_expr_list(parser, TokenKind::CloseParen)?;

    Ok(ExprWrapper::new(CallExpr {
        span: parser.span_from(&left.get_span().start),
        callee: left,
        arguments,
        overload: None,
        ty: None,
    }))
}

pub fn parse_index_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    _bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    parser.expect(TokenKind::OpenBracket)?;
    let index = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    Ok(ExprWrapper::new(IndexExpr {
        span: parser.span_from(&left.get_span().start),
        object: left,
        index,
        ty: None,
    }))
}

pub fn parse_member_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    _bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    parser.expect(TokenKind::Dot)?;
    let error = parser.unexpected_detailed("expected member name after `.`");
    let member = parser.expect_error(TokenKind::Identifier, Some(error))?;

    Ok(ExprWrapper::new(MemberExpr {
        span: left.get_span().to(&member.span),
        object: left,
        member: member.value,
        ty: None,
    }))
}

/// `new Foo(args)`
pub fn parse_init_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.expect(TokenKind::New)?.span.start;
    let error = parser.unexpected_detailed("expected class name after `new`");
    let class = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    parser.expect(TokenKind::OpenParen)?;
    let arguments = parse_expr_list(parser, TokenKind::CloseParen)?;

    Ok(ExprWrapper::new(InitExpr {
        class,
        arguments,
        span: parser.span_from(&start),
        overload: None,
        ty: None,
    }))
}

/// `fn<T>(a: int, b: T) -> int { ... }`
pub fn parse_function_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.expect(TokenKind::Fn)?.span.start;

    let mut generics = vec![];
    if parser.eat(TokenKind::Less) {
        loop {
            generics.push(parser.expect(TokenKind::Identifier)?.value);
            if !parser.eat(TokenKind::Comma) {
                break;
            }
        }
        parser.expect(TokenKind::Greater)?;
    }

    parser.expect(TokenKind::OpenParen)?;
    let mut parameters = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        let error = parser.unexpected_detailed("expected parameter name");
        let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;
        parser.expect(TokenKind::Colon)?;
        let annotation = parse_type(parser, BindingPower::Default)?;
        parameters.push(Parameter { name, annotation });
        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }
    parser.expect(TokenKind::CloseParen)?;

    let return_type = if parser.eat(TokenKind::Arrow) {
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };
    let body = parse_block(parser)?;

    Ok(ExprWrapper::new(FunctionExpr {
        generics,
        parameters,
        return_type,
        body,
        span: parser.span_from(&start),
        ty: None,
    }))
}
