use std::rc::Rc;

use crate::errors::errors::{Error, ErrorImpl};
use crate::{Position, Span};

use super::{get_line_at_position, render, render_internal, RenderOptions};

const SOURCE: &str = "class Foo { x: int }\ny = Foo()\n    z = y.w\n";

fn span(start: u32, end: u32) -> Span {
    let file = Rc::new("main.sp".to_string());
    Span::new(Position(start, Rc::clone(&file)), Position(end, file))
}

#[test]
fn test_get_line_at_position() {
    assert_eq!(
        get_line_at_position(SOURCE, 6),
        (1, "class Foo { x: int }".to_string(), 6)
    );
    assert_eq!(get_line_at_position(SOURCE, 21), (2, "y = Foo()".to_string(), 0));
    assert_eq!(get_line_at_position(SOURCE, 37), (3, "    z = y.w".to_string(), 6));
}

#[test]
fn test_get_line_past_end_points_after_last_character() {
    assert_eq!(get_line_at_position("a = 1", 40), (1, "a = 1".to_string(), 5));
    assert_eq!(get_line_at_position("", 0), (1, String::new(), 0));
}

#[test]
fn test_render_plain() {
    let error = Error::new(
        ErrorImpl::NoSuchMember {
            class: "Foo".to_string(),
            member: "w".to_string(),
        },
        span(39, 42),
    );

    let rendered = render(&error, SOURCE, &RenderOptions::default());
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines[0], "error: NoSuchMember (Class `Foo` has no member `w`)");
    assert_eq!(lines[1], "-> main.sp:3:9");
    assert_eq!(lines[2], "  |");
    assert_eq!(lines[3], "3 | z = y.w");
    assert_eq!(lines[4], "  |     ^^^");
    assert!(!rendered.contains('\x1b'));
}

#[test]
fn test_render_warning_in_color() {
    let error = Error::warning(
        ErrorImpl::Unimplemented {
            feature: "Generic classes".to_string(),
        },
        span(0, 5),
    );

    let rendered = render(&error, SOURCE, &RenderOptions { color: true });
    assert!(rendered.starts_with("\x1b[1;33mwarning\x1b[0m"));
    assert!(rendered.contains("Generic classes are not supported yet"));
}

#[test]
fn test_render_without_tip_shows_message() {
    let error = Error::at(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        Position(0, Rc::new("main.sp".to_string())),
    );

    let rendered = render(&error, "@", &RenderOptions::default());
    assert!(rendered.starts_with("error: UnrecognisedToken: unrecognised token: \"@\""));
    assert!(rendered.contains("  | ^"));
}

#[test]
fn test_render_internal() {
    let rendered = render_internal("class id 9 out of range", &RenderOptions::default());
    assert!(rendered.starts_with("internal compiler error: class id 9 out of range"));
}
