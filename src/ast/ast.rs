use std::{any::Any, fmt::Debug, ops::Deref};

use crate::{
    type_checker::type_checker::{CheckResult, TypeChecker},
    types::Type,
    Span,
};

use super::statements::ExpressionStmt;

/// Statement Types
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum StmtType {
    Program,
    BlockStmt,
    ExpressionStmt,
    DefinitionStmt,
    TypeDeclStmt,
    ClassDeclStmt,
    ImplStmt,
    IfStmt,
    WhileStmt,
    DoWhileStmt,
    SwitchStmt,
    ReturnStmt,
}

/// Statement Trait
///
/// Defines the behavior of all statement types in the AST.
pub trait Stmt: Debug {
    /// Returns the type of the statement.
    fn get_stmt_type(&self) -> StmtType;
    /// Type conversion purposes - used with `.downcast_ref<T>()`
    fn as_any(&self) -> &dyn Any;
    /// Checks the statement, mutating the checker's scopes.
    ///
    /// Statements that produce a value (definitions, expression statements)
    /// return its type, everything else returns `Type::None`.
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type>;
    /// Clones the statement into a StmtWrapper.
    /// Clone cannot be derived for certain trait objects, so this method is necessary.
    fn clone_wrapper(&self) -> StmtWrapper;
    /// Returns the span of the statement.
    fn get_span(&self) -> &Span;
}

/// Statement Wrapper
///
/// A wrapper that allows for any statement kind to be stored with helper methods
#[derive(Debug)]
pub struct StmtWrapper(Box<dyn Stmt>);

impl StmtWrapper {
    pub fn new<T: Stmt + 'static>(stmt: T) -> Self {
        StmtWrapper(Box::new(stmt))
    }

    pub fn downcast_ref<T: Stmt + 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl Deref for StmtWrapper {
    type Target = Box<dyn Stmt>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Stmt for StmtWrapper {
    fn get_stmt_type(&self) -> StmtType {
        self.0.get_stmt_type()
    }
    fn as_any(&self) -> &dyn Any {
        self.0.as_any()
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        self.0.get_type(type_checker)
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        self.0.clone_wrapper()
    }
    fn get_span(&self) -> &Span {
        self.0.get_span()
    }
}

impl Clone for StmtWrapper {
    fn clone(&self) -> Self {
        self.clone_wrapper()
    }
}

/// Expression Types
///
/// Defines the various kinds of expressions in the AST.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum ExprType {
    Literal,
    Symbol,
    Member,
    Call,
    Index,
    Init,
    Cast,
    Tuple,
    Spread,
    Binary,
    Array,
    Function,
}

pub trait Expr: Debug {
    /// Returns the expression type of the expression.
    fn get_expr_type(&self) -> ExprType;
    /// Type conversion purposes - used with `.downcast_ref<T>()`
    fn as_any(&self) -> &dyn Any;
    /// Checks the expression and records its resolved type on the node.
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type>;
    /// The type recorded by the last successful `get_type`.
    fn resolved_type(&self) -> Option<&Type>;
    /// Clones the expression into an ExprWrapper.
    /// Clone cannot be derived for certain trait objects, so this method is necessary.
    fn clone_wrapper(&self) -> ExprWrapper;
    /// Returns the span of the expression.
    fn get_span(&self) -> &Span;
}

/// Expression Wrapper
///
/// A wrapper that allows for any expression kind to be stored with helper methods
#[derive(Debug)]
pub struct ExprWrapper(Box<dyn Expr>);

impl ExprWrapper {
    pub fn new<T: Expr + 'static>(expression: T) -> Self {
        ExprWrapper(Box::new(expression))
    }

    pub fn downcast_ref<T: Expr + 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Wraps the expression in an expression statement.
    pub fn into_stmt_wrapper(self) -> StmtWrapper {
        let span = self.get_span().clone();
        StmtWrapper::new(ExpressionStmt {
            expression: self,
            span,
        })
    }
}

impl Expr for ExprWrapper {
    fn get_expr_type(&self) -> ExprType {
        self.0.get_expr_type()
    }
    fn as_any(&self) -> &dyn Any {
        self.0.as_any()
    }
    fn get_type(&mut self, type_checker: &mut TypeChecker) -> CheckResult<Type> {
        self.0.get_type(type_checker)
    }
    fn resolved_type(&self) -> Option<&Type> {
        self.0.resolved_type()
    }
    fn clone_wrapper(&self) -> ExprWrapper {
        self.0.clone_wrapper()
    }
    fn get_span(&self) -> &Span {
        self.0.get_span()
    }
}

impl Clone for ExprWrapper {
    fn clone(&self) -> Self {
        self.clone_wrapper()
    }
}

/// Stores the outcome of a check on the node's type slot.
///
/// A failed check clears the slot so stale types from an earlier run never
/// survive.
pub(crate) fn record(slot: &mut Option<Type>, result: CheckResult<Type>) -> CheckResult<Type> {
    *slot = result.as_ref().ok().cloned();
    result
}
