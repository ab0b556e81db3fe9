use crate::{
    ast::{
        ast::{Stmt, StmtWrapper},
        statements::{
            BlockStmt, CasePattern, ClassDeclStmt, DefinitionStmt, DoWhileStmt, FieldGroup,
            IfStmt, ImplStmt, ReturnStmt, SwitchCase, SwitchStmt, TypeDeclStmt, WhileStmt,
        },
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{parser::Parser, types::parse_type};

/// Parses one statement. A trailing `;` is optional.
pub fn parse_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let stmt = parse_stmt_inner(parser)?;
    parser.eat(TokenKind::Semicolon);
    Ok(stmt)
}

fn parse_stmt_inner(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    if let Some(handler) = parser.get_stmt_lookup().get(&parser.current_token_kind()).copied() {
        return handler(parser);
    }

    if parser.current_token_kind() == TokenKind::Identifier {
        match parser.peek_kind(1) {
            TokenKind::Assignment | TokenKind::Comma => return parse_definition_stmt(parser, false),
            TokenKind::Colon => return parse_type_decl_stmt(parser, false),
            _ => {}
        }
    }

    let expr = parse_expr(parser, BindingPower::Default)?;
    Ok(expr.into_stmt_wrapper())
}

/// `{ stmt* }`
pub fn parse_block(parser: &mut Parser) -> Result<BlockStmt, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;

    let mut body = vec![];
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if !parser.has_tokens() {
            return Err(parser.unexpected_detailed("expected `}`"));
        }
        body.push(parse_stmt(parser)?);
    }
    parser.expect(TokenKind::CloseCurly)?;

    Ok(BlockStmt {
        body,
        span: parser.span_from(&start),
    })
}

/// `a, _, c = value`
fn parse_definition_stmt(parser: &mut Parser, constant: bool) -> Result<StmtWrapper, Error> {
    let start = parser.get_position();

    let mut names = vec![];
    loop {
        let error = parser.unexpected_detailed("expected a name to define");
        names.push(parser.expect_error(TokenKind::Identifier, Some(error))?.value);
        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }
    parser.expect(TokenKind::Assignment)?;
    let value = parse_expr(parser, BindingPower::Default)?;

    Ok(StmtWrapper::new(DefinitionStmt {
        names,
        value,
        constant,
        span: parser.span_from(&start),
    }))
}

/// `x: type (= value)?`
fn parse_type_decl_stmt(parser: &mut Parser, constant: bool) -> Result<StmtWrapper, Error> {
    let start = parser.get_position();

    let name = parser.expect(TokenKind::Identifier)?.value;
    parser.expect(TokenKind::Colon)?;
    let annotation = parse_type(parser, BindingPower::Default)?;

    let value = if parser.eat(TokenKind::Assignment) {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    Ok(StmtWrapper::new(TypeDeclStmt {
        name,
        annotation,
        value,
        constant,
        span: parser.span_from(&start),
    }))
}

pub fn parse_const_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    parser.expect(TokenKind::Const)?;

    match (parser.current_token_kind(), parser.peek_kind(1)) {
        (TokenKind::Identifier, TokenKind::Colon) => parse_type_decl_stmt(parser, true),
        (TokenKind::Identifier, _) => parse_definition_stmt(parser, true),
        _ => Err(parser.unexpected_detailed("expected identifier during constant definition")),
    }
}

/// Comma separated identifiers between `<` and `>`, or after `:`.
fn parse_name_list(parser: &mut Parser) -> Result<Vec<String>, Error> {
    let mut names = vec![];
    loop {
        names.push(parser.expect(TokenKind::Identifier)?.value);
        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }
    Ok(names)
}

/// `class Name<T>: Super { new(int) x, y: int "==": (Name) -> bool }`
pub fn parse_class_decl_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.expect(TokenKind::Class)?.span.start;
    let error = parser.unexpected_detailed("expected class name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    let mut generics = vec![];
    if parser.eat(TokenKind::Less) {
        generics = parse_name_list(parser)?;
        parser.expect(TokenKind::Greater)?;
    }
    let mut supers = vec![];
    if parser.eat(TokenKind::Colon) {
        supers = parse_name_list(parser)?;
    }

    parser.expect(TokenKind::OpenCurly)?;
    let mut constructors = vec![];
    let mut fields = vec![];
    while parser.current_token_kind() != TokenKind::CloseCurly {
        match parser.current_token_kind() {
            TokenKind::New => {
                parser.advance();
                parser.expect(TokenKind::OpenParen)?;
                let mut parameters = vec![];
                while parser.current_token_kind() != TokenKind::CloseParen {
                    parameters.push(parse_type(parser, BindingPower::Default)?);
                    if !parser.eat(TokenKind::Comma) {
                        break;
                    }
                }
                parser.expect(TokenKind::CloseParen)?;
                constructors.push(parameters);
            }
            TokenKind::Identifier | TokenKind::String => {
                let group_start = parser.get_position();
                let mut names = vec![];
                loop {
                    match parser.current_token_kind() {
                        TokenKind::Identifier | TokenKind::String => {
                            names.push(parser.advance().value)
                        }
                        _ => return Err(parser.unexpected_detailed("expected field name")),
                    }
                    if !parser.eat(TokenKind::Comma) {
                        break;
                    }
                }
                parser.expect(TokenKind::Colon)?;
                let annotation = parse_type(parser, BindingPower::Default)?;
                fields.push(FieldGroup {
                    names,
                    annotation,
                    span: parser.span_from(&group_start),
                });
            }
            _ => return Err(parser.unexpected_detailed("expected `new` or a field in class body")),
        }

        if !parser.eat(TokenKind::Comma) {
            parser.eat(TokenKind::Semicolon);
        }
    }
    parser.expect(TokenKind::CloseCurly)?;

    Ok(StmtWrapper::new(ClassDeclStmt {
        name,
        generics,
        supers,
        constructors,
        fields,
        span: parser.span_from(&start),
    }))
}

pub fn parse_impl_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.expect(TokenKind::Impl)?.span.start;
    let name = parser.expect(TokenKind::Identifier)?.value;
    let body = parse_block(parser)?;

    Ok(StmtWrapper::new(ImplStmt {
        name,
        body,
        span: parser.span_from(&start),
    }))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.expect(TokenKind::If)?.span.start;

    let condition = parse_expr(parser, BindingPower::Default)?;
    let then_branch = parse_block(parser)?;

    let else_branch = if parser.eat(TokenKind::Else) {
        if parser.current_token_kind() == TokenKind::If {
            let nested = parse_if_stmt(parser)?;
            Some(BlockStmt {
                span: nested.get_span().clone(),
                body: vec![nested],
            })
        } else {
            Some(parse_block(parser)?)
        }
    } else {
        None
    };

    Ok(StmtWrapper::new(IfStmt {
        condition,
        then_branch,
        else_branch,
        span: parser.span_from(&start),
    }))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.expect(TokenKind::While)?.span.start;
    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    Ok(StmtWrapper::new(WhileStmt {
        condition,
        body,
        span: parser.span_from(&start),
    }))
}

pub fn parse_do_while_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.expect(TokenKind::Do)?.span.start;
    let body = parse_block(parser)?;
    parser.expect(TokenKind::While)?;
    let condition = parse_expr(parser, BindingPower::Default)?;

    Ok(StmtWrapper::new(DoWhileStmt {
        body,
        condition,
        span: parser.span_from(&start),
    }))
}

/// `switch x { case n: int { } case 1 { } default { } }`
pub fn parse_switch_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.expect(TokenKind::Switch)?.span.start;
    let subject = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::OpenCurly)?;

    let mut cases = vec![];
    let mut default = None;
    while parser.current_token_kind() != TokenKind::CloseCurly {
        match parser.current_token_kind() {
            TokenKind::Case => {
                let case_start = parser.advance().span.start;
                let pattern = if parser.current_token_kind() == TokenKind::Identifier
                    && parser.peek_kind(1) == TokenKind::Colon
                {
                    let name = parser.advance().value;
                    parser.advance();
                    let annotation = parse_type(parser, BindingPower::Default)?;
                    CasePattern::Type { name, annotation }
                } else {
                    CasePattern::Value(parse_expr(parser, BindingPower::Default)?)
                };
                let body = parse_block(parser)?;
                cases.push(SwitchCase {
                    pattern,
                    body,
                    span: parser.span_from(&case_start),
                });
            }
            TokenKind::Default if default.is_none() => {
                parser.advance();
                default = Some(parse_block(parser)?);
            }
            _ => return Err(parser.unexpected_detailed("expected `case` or `default` in switch")),
        }
    }
    parser.expect(TokenKind::CloseCurly)?;

    Ok(StmtWrapper::new(SwitchStmt {
        subject,
        cases,
        default,
        span: parser.span_from(&start),
    }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.expect(TokenKind::Return)?.span.start;

    let value = match parser.current_token_kind() {
        TokenKind::Semicolon | TokenKind::CloseCurly | TokenKind::EOF => None,
        _ => Some(parse_expr(parser, BindingPower::Default)?),
    };

    Ok(StmtWrapper::new(ReturnStmt {
        value,
        span: parser.span_from(&start),
    }))
}
