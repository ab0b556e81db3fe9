//! Unit tests for error handling.
//!
//! This module contains tests for error kinds, severities and tips.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip, Severity};
use crate::{Position, Span};
use std::rc::Rc;

fn span(start: u32, end: u32) -> Span {
    let file = Rc::new("test.sp".to_string());
    Span::new(Position(start, Rc::clone(&file)), Position(end, file))
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnknownSymbol {
            name: "foo".to_string(),
        },
        span(10, 13),
    );

    assert_eq!(error.get_error_name(), "UnknownSymbol");
    assert_eq!(error.get_severity(), Severity::Error);
    assert!(error.is_error());
}

#[test]
fn test_error_position() {
    let error = Error::at(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        Position(42, Rc::new("test.sp".to_string())),
    );

    assert_eq!(error.get_position().0, 42);
    assert_eq!(error.get_span().end.0, 42);
}

#[test]
fn test_redefinition_error_names_both_types() {
    let error = Error::new(
        ErrorImpl::Redefinition {
            name: "x".to_string(),
            old: "int".to_string(),
            new: "string".to_string(),
        },
        span(0, 1),
    );

    assert_eq!(error.get_error_name(), "Redefinition");
    assert_eq!(
        error.get_message(),
        "`x` redefined: `int` is incompatible with `string`"
    );
}

#[test]
fn test_type_mismatch_error() {
    let error = Error::new(
        ErrorImpl::TypeMismatch {
            expected: "int".to_string(),
            received: "string".to_string(),
        },
        span(0, 4),
    );

    assert_eq!(error.get_error_name(), "TypeMismatch");
    assert_eq!(
        error.get_tip().to_string(),
        "Expected type `int`, received `string`"
    );
}

#[test]
fn test_use_before_init_tip_distinguishes_paths() {
    let never = Error::new(
        ErrorImpl::UseBeforeInit {
            name: "x".to_string(),
            conditional: false,
        },
        span(0, 1),
    );
    let sometimes = Error::new(
        ErrorImpl::UseBeforeInit {
            name: "x".to_string(),
            conditional: true,
        },
        span(0, 1),
    );

    assert_eq!(never.get_error_name(), "UseBeforeInit");
    assert!(never.get_tip().to_string().contains("never assigned"));
    assert!(sometimes.get_tip().to_string().contains("some paths"));
}

#[test]
fn test_warning_promotion() {
    let warning = Error::warning(
        ErrorImpl::Unimplemented {
            feature: "Generic classes".to_string(),
        },
        span(0, 5),
    );
    assert!(!warning.is_error());
    assert_eq!(warning.get_severity(), Severity::Warning);

    let promoted = warning.promote();
    assert!(promoted.is_error());
}

#[test]
fn test_error_tip_none() {
    let error = Error::at(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        Position(0, Rc::new("test.sp".to_string())),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_overload_errors() {
    let arity = Error::new(
        ErrorImpl::ArityMismatch {
            expected: 2,
            received: 3,
        },
        span(0, 1),
    );
    let overload = Error::new(
        ErrorImpl::NoMatchingOverload {
            callee: "C".to_string(),
            arguments: "(string)".to_string(),
        },
        span(0, 1),
    );

    assert_eq!(arity.get_error_name(), "ArityMismatch");
    assert_eq!(overload.get_error_name(), "NoMatchingOverload");
    assert_eq!(
        overload.get_message(),
        "no matching overload of `C` for (string)"
    );
}

#[test]
fn test_severity_display() {
    assert_eq!(Severity::Warning.to_string(), "warning");
    assert_eq!(Severity::Error.to_string(), "error");
    assert_eq!(Severity::Internal.to_string(), "internal compiler error");
}
