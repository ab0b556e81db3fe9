use std::{any::Any, collections::HashMap};

use crate::{
    errors::errors::ErrorImpl,
    type_checker::type_checker::{Branch, CheckResult, Failed, InitState, TypeChecker},
    types::{BuiltinKind, Type},
    Span,
};

use super::{
    ast::{Expr, ExprWrapper, Stmt, StmtType, StmtWrapper},
    types::TypeExpr,
};

/// Checks every statement, failing if any of them failed.
fn check_body(body: &mut [StmtWrapper], type_checker: &mut TypeChecker) -> CheckResult<()> {
    let mut result = Ok(());
    for stmt in body.iter_mut() {
        if stmt.get_type(type_checker).is_err() {
            result = Err(Failed);
        }
    }
    result
}

/// Program
/// The root of every AST.
#[derive(Debug, Clone)]
pub struct Program {
    pub body: Vec<StmtWrapper>,
    pub span: Span,
}

impl Stmt for Program {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::Program
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        check_body(&mut self.body, type_checker).map(|_| Type::None)
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

/// A braced statement list. Blocks open no scope of their own, the
/// construct owning them decides that.
#[derive(Debug, Clone)]
pub struct BlockStmt {
    pub body: Vec<StmtWrapper>,
    pub span: Span,
}


impl Stmt for BlockStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::BlockStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        check_body(&mut self.body, type_checker).map(|_| Type::None)
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

#[derive(Debug, Clone)]
pub struct ExpressionStmt {
    pub expression: ExprWrapper,
    pub span: Span,
}

impl Stmt for ExpressionStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::ExpressionStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        self.expression.get_type(type_checker)
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

// BINDINGS

/// Definition Statement
///
/// `a, b = value`. A spread value is destructured element by element, any
/// other value is bound to every name. `_` discards.
#[derive(Debug, Clone)]
pub struct DefinitionStmt {
    pub names: Vec<String>,
    pub value: ExprWrapper,
    pub constant: bool,
    pub span: Span,
}

impl DefinitionStmt {
    fn bind_unresolved(&self, type_checker: &mut TypeChecker) {
        for name in self.names.iter().filter(|name| *name != "_") {
            type_checker.define_unresolved(name, &self.span);
        }
    }

    fn bind(&self, name: &str, ty: Type, type_checker: &mut TypeChecker) -> CheckResult<()> {
        if name == "_" {
            return Ok(());
        }
        type_checker.define(name, ty, InitState::Initialized, self.constant, &self.span)
    }
}

impl Stmt for DefinitionStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::DefinitionStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let value = match self.value.get_type(type_checker) {
            Ok(value) => value,
            Err(failed) => {
                self.bind_unresolved(type_checker);
                return Err(failed);
            }
        };

        let mut result = Ok(());
        match &value {
            Type::Spread(elements) => {
                if elements.len() != self.names.len() {
                    self.bind_unresolved(type_checker);
                    return Err(type_checker.error(
                        ErrorImpl::ArityMismatch {
                            expected: elements.len(),
                            received: self.names.len(),
                        },
                        &self.span,
                    ));
                }
                for (name, ty) in self.names.iter().zip(elements.iter()) {
                    if self.bind(name, ty.clone(), type_checker).is_err() {
                        result = Err(Failed);
                    }
                }
            }
            _ => {
                for name in &self.names {
                    if self.bind(name, value.clone(), type_checker).is_err() {
                        result = Err(Failed);
                    }
                }
            }
        }
        result.map(|_| value)
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

/// Type Declaration Statement
/// `x: int` or `x: int = 1`. Without a value the variable starts out
/// uninitialized.
#[derive(Debug, Clone)]
pub struct TypeDeclStmt {
    pub name: String,
    pub annotation: TypeExpr,
    pub value: Option<ExprWrapper>,
    pub constant: bool,
    pub span: Span,
}

impl Stmt for TypeDeclStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::TypeDeclStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let annotation = type_checker.resolve_annotation(&self.annotation);
        let value = self.value.as_mut().map(|value| value.get_type(type_checker));
        let Ok(annotation) = annotation else {
            type_checker.define_unresolved(&self.name, &self.span);
            return Err(Failed);
        };

        // A bad value still leaves the name bound with its declared type.
        let (init, checked) = match value {
            Some(Ok(value)) => {
                let span = self.value.as_ref().map_or(&self.span, |value| value.get_span());
                (InitState::Initialized, type_checker.expect_type(&value, &annotation, span))
            }
            Some(Err(failed)) => (InitState::Initialized, Err(failed)),
            None => (InitState::Uninitialized, Ok(())),
        };

        type_checker.define(&self.name, annotation.clone(), init, self.constant, &self.span)?;
        checked.map(|_| annotation)
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

// CLASSES

/// `x, y: int` inside a class body.
#[derive(Debug, Clone)]
pub struct FieldGroup {
    pub names: Vec<String>,
    pub annotation: TypeExpr,
    pub span: Span,
}

/// Class Declaration Statement
///
/// Declares the class before its fields are resolved so fields may refer to
/// the class itself. Generic parameters and super types parse but are
/// ignored with a warning.
#[derive(Debug, Clone)]
pub struct ClassDeclStmt {
    pub name: String,
    pub generics: Vec<String>,
    pub supers: Vec<String>,
    pub constructors: Vec<Vec<TypeExpr>>,
    pub fields: Vec<FieldGroup>,
    pub span: Span,
}

impl Stmt for ClassDeclStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::ClassDeclStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        if !type_checker.at_root() {
            type_checker.define_unresolved(&self.name, &self.span);
            return Err(type_checker.error(
                ErrorImpl::Unimplemented {
                    feature: String::from("Nested class declarations"),
                },
                &self.span,
            ));
        }
        if !self.generics.is_empty() {
            type_checker.warn(
                ErrorImpl::Unimplemented {
                    feature: String::from("Generic classes"),
                },
                &self.span,
            );
        }
        if !self.supers.is_empty() {
            type_checker.warn(
                ErrorImpl::Unimplemented {
                    feature: String::from("Super types"),
                },
                &self.span,
            );
        }

        let declared = match type_checker.lookup(&self.name) {
            Some(existing) if !existing.unresolved => Err(existing.ty.to_string()),
            _ => type_checker.classes.declare(&self.name).map_err(|existing| {
                type_checker.classes.object(existing).to_string()
            }),
        };
        let id = match declared {
            Ok(id) => id,
            Err(old) => {
                return Err(type_checker.error(
                    ErrorImpl::Redefinition {
                        name: self.name.clone(),
                        old,
                        new: format!("class {}", self.name),
                    },
                    &self.span,
                ))
            }
        };
        let class = Type::Class(type_checker.classes.handle(id));
        type_checker.define(&self.name, class.clone(), InitState::Initialized, true, &self.span)?;

        let mut result = Ok(());
        let mut seen: HashMap<&str, Type> = HashMap::new();
        for group in &self.fields {
            let Ok(ty) = type_checker.resolve_annotation(&group.annotation) else {
                result = Err(Failed);
                continue;
            };
            for name in &group.names {
                if let Some(old) = seen.get(name.as_str()) {
                    let kind = ErrorImpl::Redefinition {
                        name: name.clone(),
                        old: old.to_string(),
                        new: ty.to_string(),
                    };
                    result = Err(type_checker.error(kind, &group.span));
                    continue;
                }
                seen.insert(name, ty.clone());
                type_checker.classes.get_mut(id).fields.insert(name.as_str(), ty.clone());
            }
        }

        for constructor in &self.constructors {
            let mut parameters = Vec::with_capacity(constructor.len());
            for annotation in constructor {
                match type_checker.resolve_annotation(annotation) {
                    Ok(ty) => parameters.push(ty),
                    Err(failed) => result = Err(failed),
                }
            }
            if parameters.len() == constructor.len() {
                type_checker.classes.get_mut(id).constructors.push(parameters);
            }
        }

        type_checker.classes.add_comparison(id);
        result.map(|_| class)
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

/// Impl Statement
/// `impl Foo { ... }`. Parsed, but method blocks are not checked yet.
#[derive(Debug, Clone)]
pub struct ImplStmt {
    pub name: String,
    pub body: BlockStmt,
    pub span: Span,
}

impl Stmt for ImplStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::ImplStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        Err(type_checker.error(
            ErrorImpl::Unimplemented {
                feature: String::from("Impl blocks"),
            },
            &self.span,
        ))
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

// CONTROL FLOW

/// Checks `block` in a fresh branch scope, always leaving the branch.
fn check_branch(
    block: &mut BlockStmt,
    type_checker: &mut TypeChecker,
) -> (CheckResult<Type>, Branch) {
    type_checker.enter_branch();
    let result = block.get_type(type_checker);
    (result, type_checker.exit_branch())
}

/// If Statement
/// `else if` chains are nested: the inner `if` is the only statement of the
/// else block.
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: ExprWrapper,
    pub then_branch: BlockStmt,
    pub else_branch: Option<BlockStmt>,
    pub span: Span,
}

impl Stmt for IfStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::IfStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let condition = self.condition.get_type(type_checker).and_then(|condition| {
            type_checker.check_condition(&condition, self.condition.get_span())
        });

        let mut arms = vec![];
        let (then_result, then_arm) = check_branch(&mut self.then_branch, type_checker);
        arms.push(then_arm);
        let mut else_result = Ok(Type::None);
        if let Some(else_branch) = self.else_branch.as_mut() {
            let (result, arm) = check_branch(else_branch, type_checker);
            else_result = result;
            arms.push(arm);
        }

        let merged = type_checker.merge_branches(arms, self.else_branch.is_some(), &self.span);
        condition?;
        then_result?;
        else_result?;
        merged.map(|_| Type::None)
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: ExprWrapper,
    pub body: BlockStmt,
    pub span: Span,
}

impl Stmt for WhileStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::WhileStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let condition = self.condition.get_type(type_checker).and_then(|condition| {
            type_checker.check_condition(&condition, self.condition.get_span())
        });

        let (body, arm) = check_branch(&mut self.body, type_checker);
        let merged = type_checker.merge_branches(vec![arm], false, &self.span);
        condition?;
        body?;
        merged.map(|_| Type::None)
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

/// Do-While Statement
/// The condition is checked inside the body's branch, so it may read what
/// the body initialized.
#[derive(Debug, Clone)]
pub struct DoWhileStmt {
    pub body: BlockStmt,
    pub condition: ExprWrapper,
    pub span: Span,
}

impl Stmt for DoWhileStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::DoWhileStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        type_checker.enter_branch();
        let body = self.body.get_type(type_checker);
        let condition = self.condition.get_type(type_checker).and_then(|condition| {
            type_checker.check_condition(&condition, self.condition.get_span())
        });
        let arm = type_checker.exit_branch();

        let merged = type_checker.merge_branches(vec![arm], false, &self.span);
        body?;
        condition?;
        merged.map(|_| Type::None)
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

#[derive(Debug, Clone)]
pub enum CasePattern {
    /// `case n: int { ... }` binds `n` inside the arm.
    Type { name: String, annotation: TypeExpr },
    /// `case 1 { ... }` compares with the subject's `"=="`.
    Value(ExprWrapper),
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub pattern: CasePattern,
    pub body: BlockStmt,
    pub span: Span,
}

impl SwitchCase {
    /// Checks the pattern against the subject, inside the arm's branch.
    fn check_pattern(&mut self, subject: &Type, type_checker: &mut TypeChecker) -> CheckResult<()> {
        match &mut self.pattern {
            CasePattern::Type { name, annotation } => {
                let pattern = type_checker.resolve_annotation(annotation)?;
                let narrows = |wrapped: &Type| type_checker.classes.compare(&pattern, wrapped).is_ok();
                let accepted = narrows(subject)
                    || matches!(subject, Type::Maybe(wrapped) if narrows(wrapped));
                if !accepted {
                    return Err(type_checker.error(
                        ErrorImpl::TypeMismatch {
                            expected: subject.to_string(),
                            received: pattern.to_string(),
                        },
                        annotation.get_span(),
                    ));
                }
                type_checker.shadow(name, pattern, &self.span);
                Ok(())
            }
            CasePattern::Value(value) => {
                let ty = value.get_type(type_checker)?;
                let (_, result) = type_checker.call_member(subject, "==", &[ty], value.get_span())?;
                if !type_checker.builtins.is(&result, BuiltinKind::Bool) {
                    return Err(type_checker.error(
                        ErrorImpl::TypeMismatch {
                            expected: BuiltinKind::Bool.name().to_string(),
                            received: result.to_string(),
                        },
                        value.get_span(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Switch Statement
///
/// Exactly one arm runs only when a default is present, so only then can
/// the arms initialize variables for the code after the switch.
#[derive(Debug, Clone)]
pub struct SwitchStmt {
    pub subject: ExprWrapper,
    pub cases: Vec<SwitchCase>,
    pub default: Option<BlockStmt>,
    pub span: Span,
}

impl Stmt for SwitchStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::SwitchStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let subject = self.subject.get_type(type_checker)?;

        let mut result = Ok(());
        let mut arms = Vec::with_capacity(self.cases.len() + 1);
        for case in self.cases.iter_mut() {
            type_checker.enter_branch();
            if case.check_pattern(&subject, type_checker).is_err() {
                result = Err(Failed);
            }
            if case.body.get_type(type_checker).is_err() {
                result = Err(Failed);
            }
            let mut arm = type_checker.exit_branch();
            if let CasePattern::Type { name, .. } = &case.pattern {
                // the pattern binding ends with its arm
                arm.symbols.remove(name);
            }
            arms.push(arm);
        }
        if let Some(default) = self.default.as_mut() {
            let (body, arm) = check_branch(default, type_checker);
            if body.is_err() {
                result = Err(Failed);
            }
            arms.push(arm);
        }

        let merged = type_checker.merge_branches(arms, self.default.is_some(), &self.span);
        result?;
        merged.map(|_| Type::None)
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<ExprWrapper>,
    pub span: Span,
}

impl Stmt for ReturnStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::ReturnStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        let value = match self.value.as_mut() {
            Some(value) => value.get_type(type_checker)?,
            None => Type::None,
        };
        type_checker.record_return(value.clone(), &self.span)?;
        Ok(value)
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}
