//! Integration tests for the whole front end.
//!
//! These tests run source text through tokenization, parsing and type
//! checking, then look at the checked program and its rendered diagnostics.

use std::rc::Rc;

use spreadc::{
    ast::{ast::Expr, expressions::BinaryExpr, statements::DefinitionStmt},
    diagnostics::{render, RenderOptions},
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::{type_check, CheckOptions, CheckedProgram},
    types::BuiltinKind,
};

fn check_source(source: &str, options: CheckOptions) -> CheckedProgram {
    let tokens = tokenize(source.to_string(), Some("main.sp".to_string())).unwrap();
    let (_, ast) = parse(tokens, Rc::new("main.sp".to_string()));
    let mut ast = ast.unwrap();
    type_check(&mut ast, &options)
}

#[test]
fn test_check_simple_program() {
    let checked = check_source("x = 42", CheckOptions::default());

    assert!(checked.is_ok(), "Type checking should succeed");
    assert_eq!(
        checked.global("x").unwrap().ty,
        checked.builtin(BuiltinKind::Int)
    );
}

#[test]
fn test_check_program_with_classes_and_functions() {
    let source = r#"
        class Vec2 {
            new(double, double)
            x, y: double
            "+": (Vec2) -> Vec2
            "==": (Vec2) -> bool
        }

        origin = Vec2(0.0, 0.0)
        step = new Vec2(1.0, 0.5)
        moved = origin + step
        same = moved == origin

        length = fn(v: Vec2) -> double {
            return v.x * v.x + v.y * v.y
        }
        describe = fn(v: Vec2) -> string {
            if length(v) > 1.0 {
                label = "long"
            } else {
                label = "short"
            }
            return label
        }
        text = describe(moved)
    "#;

    let checked = check_source(source, CheckOptions::default());

    assert!(checked.is_ok(), "{:?}", checked.diagnostics);
    let vec2 = checked.class_table().get("Vec2").copied().unwrap();
    assert_eq!(checked.global("moved").unwrap().ty.object_class(), Some(vec2));
    assert_eq!(
        checked.global("same").unwrap().ty,
        checked.builtin(BuiltinKind::Bool)
    );
    assert_eq!(
        checked.global("text").unwrap().ty,
        checked.builtin(BuiltinKind::String)
    );
    assert_eq!(checked.functions.len(), 2);
}

#[test]
fn test_branch_arms_meet_at_common_class() {
    let source = r#"
        class Shape { area: int }
        class Sq { area: int, side: int }
        class Ci { area: int, radius: int }

        wide = true
        if wide {
            s = Sq()
        } else {
            s = Ci()
        }
        a = s.area
    "#;

    let checked = check_source(source, CheckOptions::default());

    assert!(checked.is_ok(), "{:?}", checked.diagnostics);
    let shape = checked.class_table().get("Shape").copied().unwrap();
    assert_eq!(checked.global("s").unwrap().ty.object_class(), Some(shape));
    assert!(checked.global("s").unwrap().is_initialized());
    assert_eq!(
        checked.global("a").unwrap().ty,
        checked.builtin(BuiltinKind::Int)
    );
}

#[test]
fn test_check_reports_every_error() {
    let source = "
        a = 1
        b: string = a
        c = missing
        flag = true
        if flag { d = 1 }
        e = d
    ";

    let checked = check_source(source, CheckOptions::default());

    let names: Vec<&str> = checked.errors().map(|error| error.get_error_name()).collect();
    assert_eq!(names, vec!["TypeMismatch", "UnknownSymbol", "UseBeforeInit"]);
}

#[test]
fn test_operator_overload_is_recorded() {
    let tokens = tokenize("x = 1 < 2".to_string(), Some("main.sp".to_string())).unwrap();
    let (_, ast) = parse(tokens, Rc::new("main.sp".to_string()));
    let mut ast = ast.unwrap();
    let checked = type_check(&mut ast, &CheckOptions::default());

    assert!(checked.is_ok());
    let definition = ast.body[0].downcast_ref::<DefinitionStmt>().unwrap();
    let comparison = definition.value.downcast_ref::<BinaryExpr>().unwrap();
    assert_eq!(comparison.overload, Some(0));
    assert_eq!(
        comparison.resolved_type(),
        Some(&checked.builtin(BuiltinKind::Bool))
    );
}

#[test]
fn test_warnings_as_errors() {
    let source = "class Pair<A, B> { }";

    let lenient = check_source(source, CheckOptions::default());
    assert!(lenient.is_ok());
    assert_eq!(lenient.warnings().count(), 1);

    let strict = check_source(
        source,
        CheckOptions {
            warnings_as_errors: true,
        },
    );
    assert!(!strict.is_ok());
    assert_eq!(strict.errors().count(), 1);
}

#[test]
fn test_rendered_diagnostic_points_at_source() {
    let source = "x = 1\ny = x + \"s\"\n";
    let checked = check_source(source, CheckOptions::default());

    let error = checked.errors().next().unwrap();
    let rendered = render(error, source, &RenderOptions { color: false });

    assert!(rendered.starts_with("error: NoMatchingOverload"));
    assert!(rendered.contains("-> main.sp:2:5"));
    assert!(rendered.contains("2 | y = x + \"s\""));
    assert!(!rendered.contains('\x1b'));
}

#[test]
fn test_lexer_error_surfaces() {
    let result = tokenize("x = #".to_string(), Some("main.sp".to_string()));
    assert!(result.is_err());
}

#[test]
fn test_parse_error_surfaces() {
    let tokens = tokenize("class { }".to_string(), Some("main.sp".to_string())).unwrap();
    let (_, ast) = parse(tokens, Rc::new("main.sp".to_string()));

    let error = ast.unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}
