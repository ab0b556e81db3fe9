use std::fmt::Display;

use thiserror::Error;

use crate::{Position, Span};

/// How seriously a diagnostic affects the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
    /// Checker invariant violation. Never produced for well-formed input.
    Internal,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Internal => write!(f, "internal compiler error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    span: Span,
    severity: Severity,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, span: Span) -> Self {
        Error {
            internal_error: error_impl,
            span,
            severity: Severity::Error,
        }
    }

    pub fn warning(error_impl: ErrorImpl, span: Span) -> Self {
        Error {
            internal_error: error_impl,
            span,
            severity: Severity::Warning,
        }
    }

    /// Builds an error for a single point in the source, as the lexer and
    /// parser report them.
    pub fn at(error_impl: ErrorImpl, position: Position) -> Self {
        Error::new(error_impl, Span::new(position.clone(), position))
    }

    pub fn get_position(&self) -> &Position {
        &self.span.start
    }

    pub fn get_span(&self) -> &Span {
        &self.span
    }

    pub fn get_kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_severity(&self) -> Severity {
        self.severity
    }

    pub fn is_error(&self) -> bool {
        self.severity >= Severity::Error
    }

    /// Upgrades a warning to an error, used by `--werror`.
    pub fn promote(mut self) -> Self {
        if self.severity == Severity::Warning {
            self.severity = Severity::Error;
        }
        self
    }

    pub fn get_message(&self) -> String {
        self.internal_error.to_string()
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnknownSymbol { .. } => "UnknownSymbol",
            ErrorImpl::UseBeforeInit { .. } => "UseBeforeInit",
            ErrorImpl::Redefinition { .. } => "Redefinition",
            ErrorImpl::ArityMismatch { .. } => "ArityMismatch",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::NotAnObject { .. } => "NotAnObject",
            ErrorImpl::NoSuchMember { .. } => "NoSuchMember",
            ErrorImpl::NoSuchCast { .. } => "NoSuchCast",
            ErrorImpl::NoMatchingOverload { .. } => "NoMatchingOverload",
            ErrorImpl::Unimplemented { .. } => "Unimplemented",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::MissingReturn { .. } => "MissingReturn",
            ErrorImpl::CannotInferType { .. } => "CannotInferType",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`", token))
            }
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnknownSymbol { name } => {
                ErrorTip::Suggestion(format!("`{}` is not declared in this scope", name))
            }
            ErrorImpl::UseBeforeInit { name, conditional } => {
                if *conditional {
                    ErrorTip::Suggestion(format!(
                        "`{}` is only assigned on some paths reaching this use",
                        name
                    ))
                } else {
                    ErrorTip::Suggestion(format!("`{}` is declared but never assigned", name))
                }
            }
            ErrorImpl::Redefinition { name, old, new } => ErrorTip::Suggestion(format!(
                "`{}` already has type `{}`, cannot rebind it as `{}`",
                name, old, new
            )),
            ErrorImpl::ArityMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} values, received {}",
                expected, received
            )),
            ErrorImpl::TypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::NotAnObject { type_ } => ErrorTip::Suggestion(format!(
                "Members can only be read from class instances, found `{}`",
                type_
            )),
            ErrorImpl::NoSuchMember { class, member } => {
                ErrorTip::Suggestion(format!("Class `{}` has no member `{}`", class, member))
            }
            ErrorImpl::NoSuchCast { from, to } => ErrorTip::Suggestion(format!(
                "`{}` does not declare a `=>` cast to `{}`",
                from, to
            )),
            ErrorImpl::NoMatchingOverload { callee, arguments } => ErrorTip::Suggestion(
                format!("No overload of `{}` accepts {}", callee, arguments),
            ),
            ErrorImpl::Unimplemented { feature } => ErrorTip::Suggestion(format!(
                "{} are not supported yet",
                feature
            )),
            ErrorImpl::ReturnOutsideFunction => {
                ErrorTip::Suggestion(String::from("`return` may only appear inside `fn`"))
            }
            ErrorImpl::MissingReturn { expected } => ErrorTip::Suggestion(format!(
                "Not every path returns a value of type `{}`",
                expected
            )),
            ErrorImpl::CannotInferType { expression } => ErrorTip::Suggestion(format!(
                "Cannot infer a type for {}",
                expression
            )),
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("unknown symbol `{name}`")]
    UnknownSymbol { name: String },
    #[error("`{name}` used before initialization")]
    UseBeforeInit { name: String, conditional: bool },
    #[error("`{name}` redefined: `{old}` is incompatible with `{new}`")]
    Redefinition { name: String, old: String, new: String },
    #[error("arity mismatch: expected {expected}, received {received}")]
    ArityMismatch { expected: usize, received: usize },
    #[error("types do not match: expected `{expected}`, received `{received}`")]
    TypeMismatch { expected: String, received: String },
    #[error("`{type_}` is not an object")]
    NotAnObject { type_: String },
    #[error("class `{class}` has no member `{member}`")]
    NoSuchMember { class: String, member: String },
    #[error("no cast from `{from}` to `{to}`")]
    NoSuchCast { from: String, to: String },
    #[error("no matching overload of `{callee}` for {arguments}")]
    NoMatchingOverload { callee: String, arguments: String },
    #[error("{feature} are not implemented")]
    Unimplemented { feature: String },
    #[error("return outside of a function")]
    ReturnOutsideFunction,
    #[error("missing return of type `{expected}`")]
    MissingReturn { expected: String },
    #[error("cannot infer the type of {expression}")]
    CannotInferType { expression: String },
}
