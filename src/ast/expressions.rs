use std::any::Any;

use crate::{
    containers::RunList,
    errors::errors::ErrorImpl,
    lexer::tokens::{Token, TokenKind},
    type_checker::type_checker::{expand_arguments, CheckResult, Failed, TypeChecker},
    types::{BuiltinKind, FuncType, Overload, Type},
    Span,
};

use super::{
    ast::{record, Expr, ExprType, ExprWrapper, Stmt},
    statements::BlockStmt,
    types::TypeExpr,
};

/// Checks every argument before giving up, so each bad argument is reported.
fn check_all(
    expressions: &mut [ExprWrapper],
    type_checker: &mut TypeChecker,
) -> CheckResult<Vec<Type>> {
    let mut types = Vec::with_capacity(expressions.len());
    let mut failed = false;
    for expression in expressions.iter_mut() {
        match expression.get_type(type_checker) {
            Ok(ty) => types.push(ty),
            Err(Failed) => failed = true,
        }
    }
    if failed {
        Err(Failed)
    } else {
        Ok(types)
    }
}

/// The name a callee is reported under.
fn callee_name(callee: &ExprWrapper) -> String {
    if let Some(symbol) = callee.downcast_ref::<SymbolExpr>() {
        symbol.name.clone()
    } else if let Some(member) = callee.downcast_ref::<MemberExpr>() {
        member.member.clone()
    } else {
        String::from("<expression>")
    }
}

// LITERALS

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Double(f64),
    String(String),
    Bool(bool),
    None,
}

/// Literal Expression
/// Numbers, strings, `true`/`false` and `none`.
#[derive(Debug, Clone)]
pub struct LiteralExpr {
    pub value: Literal,
    pub span: Span,
    pub ty: Option<Type>,
}

impl LiteralExpr {
    fn check(&self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        Ok(match self.value {
            Literal::Int(_) => type_checker.builtin(BuiltinKind::Int),
            Literal::Double(_) => type_checker.builtin(BuiltinKind::Double),
            Literal::String(_) => type_checker.builtin(BuiltinKind::String),
            Literal::Bool(_) => type_checker.builtin(BuiltinKind::Bool),
            Literal::None => Type::None,
        })
    }
}

impl Expr for LiteralExpr {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_expr_type(&self) -> ExprType {
        ExprType::Literal
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let result = self.check(type_checker);
        record(&mut self.ty, result)
    }
    fn resolved_type(&self) -> Option<&Type> {
        self.ty.as_ref()
    }
    fn clone_wrapper(&self) -> ExprWrapper {
        ExprWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

/// Symbol Expression
/// A variable reference. Reading requires the variable to be initialized on
/// every path.
#[derive(Debug, Clone)]
pub struct SymbolExpr {
    pub name: String,
    pub span: Span,
    pub ty: Option<Type>,
}

impl Expr for SymbolExpr {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_expr_type(&self) -> ExprType {
        ExprType::Symbol
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let result = type_checker.read(&self.name, &self.span);
        record(&mut self.ty, result)
    }
    fn resolved_type(&self) -> Option<&Type> {
        self.ty.as_ref()
    }
    fn clone_wrapper(&self) -> ExprWrapper {
        ExprWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

// ACCESS

/// Member Expression
/// `object.member`
#[derive(Debug, Clone)]
pub struct MemberExpr {
    pub object: ExprWrapper,
    pub member: String,
    pub span: Span,
    pub ty: Option<Type>,
}

impl MemberExpr {
    fn check(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let object = self.object.get_type(type_checker)?;
        type_checker.member(&object, &self.member, &self.span)
    }
}

impl Expr for MemberExpr {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_expr_type(&self) -> ExprType {
        ExprType::Member
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let result = self.check(type_checker);
        record(&mut self.ty, result)
    }
    fn resolved_type(&self) -> Option<&Type> {
        self.ty.as_ref()
    }
    fn clone_wrapper(&self) -> ExprWrapper {
        ExprWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

/// Call Expression
/// Calls a function value, or constructs an object when the callee is a
/// class. `overload` is the index of the selected signature, left empty for
/// the implicit constructor of a class that declares none.
#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: ExprWrapper,
    pub arguments: Vec<ExprWrapper>,
    pub span: Span,
    pub overload: Option<usize>,
    pub ty: Option<Type>,
}

impl CallExpr {
    fn check(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let callee = self.callee.get_type(type_checker);
        let arguments = check_all(&mut self.arguments, type_checker);
        let (callee, arguments) = (callee?, expand_arguments(arguments?));

        match callee {
            Type::Func(func) => {
                let name = callee_name(&self.callee);
                let (index, return_type) =
                    type_checker.call(&name, &func, &arguments, &self.span)?;
                self.overload = Some(index);
                Ok(return_type)
            }
            Type::Class(class) => {
                self.overload = type_checker.construct(class.id, &arguments, &self.span)?;
                Ok(Type::object(&class))
            }
            other => Err(type_checker.error(
                ErrorImpl::TypeMismatch {
                    expected: String::from("function"),
                    received: other.to_string(),
                },
                &self.span,
            )),
        }
    }
}

impl Expr for CallExpr {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_expr_type(&self) -> ExprType {
        ExprType::Call
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        self.overload = None;
        let result = self.check(type_checker);
        record(&mut self.ty, result)
    }
    fn resolved_type(&self) -> Option<&Type> {
        self.ty.as_ref()
    }
    fn clone_wrapper(&self) -> ExprWrapper {
        ExprWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

/// Index Expression
/// `object[index]`
#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub object: ExprWrapper,
    pub index: ExprWrapper,
    pub span: Span,
    pub ty: Option<Type>,
}

impl IndexExpr {
    fn check(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let object = self.object.get_type(type_checker);
        let index = self.index.get_type(type_checker);
        let (object, index) = (object?, index?);

        match object {
            Type::Array(element) => {
                let int = type_checker.builtin(BuiltinKind::Int);
                type_checker.expect_type(&index, &int, self.index.get_span())?;
                Ok(*element)
            }
            Type::Tuple(_) | Type::Spread(_) => Err(type_checker.error(
                ErrorImpl::Unimplemented {
                    feature: String::from("Tuple indexing"),
                },
                &self.span,
            )),
            object @ Type::Object(_) => type_checker
                .call_member(&object, "[]", &[index], &self.span)
                .map(|(_, element)| element),
            other => Err(type_checker.error(
                ErrorImpl::NotAnObject {
                    type_: other.to_string(),
                },
                &self.span,
            )),
        }
    }
}

impl Expr for IndexExpr {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_expr_type(&self) -> ExprType {
        ExprType::Index
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let result = self.check(type_checker);
        record(&mut self.ty, result)
    }
    fn resolved_type(&self) -> Option<&Type> {
        self.ty.as_ref()
    }
    fn clone_wrapper(&self) -> ExprWrapper {
        ExprWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

// CONSTRUCTION

/// Init Expression
/// `new Foo(args)`
#[derive(Debug, Clone)]
pub struct InitExpr {
    pub class: String,
    pub arguments: Vec<ExprWrapper>,
    pub span: Span,
    pub overload: Option<usize>,
    pub ty: Option<Type>,
}

impl InitExpr {
    fn check(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let class = type_checker.read(&self.class, &self.span);
        let arguments = check_all(&mut self.arguments, type_checker);
        let (class, arguments) = (class?, expand_arguments(arguments?));

        let Type::Class(class) = class else {
            return Err(type_checker.error(
                ErrorImpl::TypeMismatch {
                    expected: String::from("class"),
                    received: class.to_string(),
                },
                &self.span,
            ));
        };
        self.overload = type_checker.construct(class.id, &arguments, &self.span)?;
        Ok(Type::object(&class))
    }
}

impl Expr for InitExpr {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_expr_type(&self) -> ExprType {
        ExprType::Init
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        self.overload = None;
        let result = self.check(type_checker);
        record(&mut self.ty, result)
    }
    fn resolved_type(&self) -> Option<&Type> {
        self.ty.as_ref()
    }
    fn clone_wrapper(&self) -> ExprWrapper {
        ExprWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

/// Cast Expression
/// `value => type`, resolved against the `"=>"` overloads of the value's
/// class. Only an overload returning exactly the target type matches.
#[derive(Debug, Clone)]
pub struct CastExpr {
    pub value: ExprWrapper,
    pub target: TypeExpr,
    pub span: Span,
    pub overload: Option<usize>,
    pub ty: Option<Type>,
}

impl CastExpr {
    fn check(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let value = self.value.get_type(type_checker);
        let target = type_checker.resolve_annotation(&self.target);
        let (value, target) = (value?, target?);

        let no_such_cast = |value: &Type, target: &Type| ErrorImpl::NoSuchCast {
            from: value.to_string(),
            to: target.to_string(),
        };

        let overloads = value
            .object_class()
            .and_then(|class| type_checker.class(class).field("=>"))
            .and_then(Type::as_func)
            .map(|func| func.overloads.clone())
            .unwrap_or_default();

        match overloads.iter().position(|overload| {
            overload.generics.is_empty()
                && overload.arguments.is_empty()
                && overload.return_type == target
        }) {
            Some(index) => {
                self.overload = Some(index);
                Ok(target)
            }
            None => Err(type_checker.error(no_such_cast(&value, &target), &self.span)),
        }
    }
}

impl Expr for CastExpr {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_expr_type(&self) -> ExprType {
        ExprType::Cast
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        self.overload = None;
        let result = self.check(type_checker);
        record(&mut self.ty, result)
    }
    fn resolved_type(&self) -> Option<&Type> {
        self.ty.as_ref()
    }
    fn clone_wrapper(&self) -> ExprWrapper {
        ExprWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

// AGGREGATES

/// Tuple Expression
/// `(a, b, ...c)`. Adjacent elements of equal type share a run and spread
/// elements are inlined.
#[derive(Debug, Clone)]
pub struct TupleExpr {
    pub elements: Vec<ExprWrapper>,
    pub span: Span,
    pub ty: Option<Type>,
}

impl Expr for TupleExpr {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_expr_type(&self) -> ExprType {
        ExprType::Tuple
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let result = check_all(&mut self.elements, type_checker).map(|elements| {
            let mut runs = RunList::new();
            for element in elements {
                match element {
                    Type::Spread(inner) => runs.extend_from(&inner),
                    other => runs.push(other),
                }
            }
            Type::Tuple(runs)
        });
        record(&mut self.ty, result)
    }
    fn resolved_type(&self) -> Option<&Type> {
        self.ty.as_ref()
    }
    fn clone_wrapper(&self) -> ExprWrapper {
        ExprWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

/// Spread Expression
/// `...tuple`
#[derive(Debug, Clone)]
pub struct SpreadExpr {
    pub value: ExprWrapper,
    pub span: Span,
    pub ty: Option<Type>,
}

impl SpreadExpr {
    fn check(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let value = self.value.get_type(type_checker)?;
        match value.to_spread() {
            Some(spread) => Ok(spread),
            None => Err(type_checker.error(
                ErrorImpl::TypeMismatch {
                    expected: String::from("tuple"),
                    received: value.to_string(),
                },
                &self.span,
            )),
        }
    }
}

impl Expr for SpreadExpr {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_expr_type(&self) -> ExprType {
        ExprType::Spread
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let result = self.check(type_checker);
        record(&mut self.ty, result)
    }
    fn resolved_type(&self) -> Option<&Type> {
        self.ty.as_ref()
    }
    fn clone_wrapper(&self) -> ExprWrapper {
        ExprWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

/// Array Expression
/// `[a, b]`, typed as the intersection of its elements.
#[derive(Debug, Clone)]
pub struct ArrayExpr {
    pub elements: Vec<ExprWrapper>,
    pub span: Span,
    pub ty: Option<Type>,
}

impl ArrayExpr {
    fn check(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let elements = check_all(&mut self.elements, type_checker)?;
        let mut elements = elements.into_iter();
        let Some(mut element) = elements.next() else {
            return Err(type_checker.error(
                ErrorImpl::CannotInferType {
                    expression: String::from("[]"),
                },
                &self.span,
            ));
        };

        for next in elements {
            element = match type_checker.classes.intersect(&element, &next) {
                Ok(merged) => merged,
                Err(mismatch) => {
                    return Err(type_checker.mismatch(mismatch, &element, &next, &self.span))
                }
            };
        }
        Ok(Type::Array(Box::new(element)))
    }
}

impl Expr for ArrayExpr {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_expr_type(&self) -> ExprType {
        ExprType::Array
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let result = self.check(type_checker);
        record(&mut self.ty, result)
    }
    fn resolved_type(&self) -> Option<&Type> {
        self.ty.as_ref()
    }
    fn clone_wrapper(&self) -> ExprWrapper {
        ExprWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

// OPERATORS

/// Binary Expression
///
/// Arithmetic and relational operators call the field of the same name on
/// the left operand's class, compound assignments additionally require the
/// left operand to be a variable, and `&&`/`||` take two conditions.
#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub left: ExprWrapper,
    pub operator: Token,
    pub right: ExprWrapper,
    pub span: Span,
    pub overload: Option<usize>,
    pub ty: Option<Type>,
}

impl BinaryExpr {
    /// The class field an operator resolves to.
    pub fn field_name(&self) -> &str {
        match self.operator.kind {
            TokenKind::NotEquals => "==",
            _ => &self.operator.value,
        }
    }

    fn check(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let left = self.left.get_type(type_checker);
        let right = self.right.get_type(type_checker);
        let (left, right) = (left?, right?);

        if matches!(self.operator.kind, TokenKind::And | TokenKind::Or) {
            let left_ok = type_checker.check_condition(&left, self.left.get_span());
            let right_ok = type_checker.check_condition(&right, self.right.get_span());
            left_ok.and(right_ok)?;
            return Ok(type_checker.builtin(BuiltinKind::Bool));
        }

        let field = self.field_name().to_string();
        let (index, result) = type_checker.call_member(&left, &field, &[right], &self.span)?;
        self.overload = Some(index);

        if self.operator.kind.is_compound_assignment() {
            // the variable keeps its type
            type_checker.expect_type(&result, &left, &self.span)?;
            return Ok(left);
        }
        Ok(result)
    }
}

impl Expr for BinaryExpr {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_expr_type(&self) -> ExprType {
        ExprType::Binary
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        self.overload = None;
        let result = self.check(type_checker);
        record(&mut self.ty, result)
    }
    fn resolved_type(&self) -> Option<&Type> {
        self.ty.as_ref()
    }
    fn clone_wrapper(&self) -> ExprWrapper {
        ExprWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

// FUNCTIONS

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub annotation: TypeExpr,
}

/// Function Expression
///
/// `fn(a: int, b: int) -> int { ... }`. Without a declared return type the
/// function returns whatever its body returns on every path, or `none`.
#[derive(Debug, Clone)]
pub struct FunctionExpr {
    pub generics: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeExpr>,
    pub body: BlockStmt,
    pub span: Span,
    pub ty: Option<Type>,
}

impl FunctionExpr {
    fn check(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        if !self.generics.is_empty() {
            return Err(type_checker.error(
                ErrorImpl::Unimplemented {
                    feature: String::from("Generic functions"),
                },
                &self.span,
            ));
        }

        let mut failed = false;
        let mut arguments = Vec::with_capacity(self.parameters.len());
        for parameter in &self.parameters {
            match type_checker.resolve_annotation(&parameter.annotation) {
                Ok(ty) => arguments.push(ty),
                Err(Failed) => failed = true,
            }
        }
        let declared = match &self.return_type {
            Some(annotation) => Some(type_checker.resolve_annotation(annotation)?),
            None => None,
        };
        if failed {
            return Err(Failed);
        }

        type_checker.enter_function(declared.clone());
        for (parameter, ty) in self.parameters.iter().zip(arguments.iter()) {
            type_checker.shadow(&parameter.name, ty.clone(), parameter.annotation.get_span());
        }
        let body = self.body.get_type(type_checker);
        let returned = type_checker.exit_function();
        body?;

        let return_type = match (declared, returned) {
            (Some(declared), None) if !declared.is_none() => {
                return Err(type_checker.error(
                    ErrorImpl::MissingReturn {
                        expected: declared.to_string(),
                    },
                    &self.span,
                ))
            }
            (Some(declared), _) => declared,
            (None, Some(returned)) => returned,
            (None, None) => Type::None,
        };

        let func = FuncType {
            overloads: vec![Overload::new(arguments, return_type)],
        };
        type_checker.register_function(&func);
        Ok(Type::Func(func))
    }
}

impl Expr for FunctionExpr {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_expr_type(&self) -> ExprType {
        ExprType::Function
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let result = self.check(type_checker);
        record(&mut self.ty, result)
    }
    fn resolved_type(&self) -> Option<&Type> {
        self.ty.as_ref()
    }
    fn clone_wrapper(&self) -> ExprWrapper {
        ExprWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}
