use std::{fmt::Write, io::IsTerminal};

use crate::errors::errors::{Error, ErrorTip, Severity};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const BLUE: &str = "\x1b[34m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub color: bool,
}

impl RenderOptions {
    /// Colour when stderr is a terminal and `NO_COLOR` is unset.
    pub fn from_env() -> Self {
        RenderOptions {
            color: std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal(),
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{}{}{}", code, text, RESET)
        } else {
            text.to_string()
        }
    }
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Warning => "\x1b[1;33m",
        Severity::Error => "\x1b[1;31m",
        Severity::Internal => "\x1b[1;35m",
    }
}

/// Finds the line holding byte `position` of `source`.
///
/// Returns the 1-based line number, the line text without its newline and
/// the 0-based column. Positions past the end land after the last character
/// so end-of-file errors still point somewhere.
pub fn get_line_at_position(source: &str, position: u32) -> (usize, String, usize) {
    let pos = position as usize;
    let mut start = 0;
    let mut line_number = 1;

    for line in source.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return (line_number, line.trim_end_matches(['\n', '\r']).to_string(), pos - start);
        }

        start = end;
        line_number += 1;
    }

    let last = source.lines().last().unwrap_or("");
    let last_number = source.lines().count().max(1);
    (last_number, last.to_string(), last.len())
}

/// Renders `error` against the text of the file it points into.
///
/// ```text
/// error: UnknownSymbol (`foo` is not declared in this scope)
/// -> main.sp:3:5
///   |
/// 3 | z = foo
///   |     ^^^
/// ```
pub fn render(error: &Error, source: &str, options: &RenderOptions) -> String {
    let mut out = String::new();
    let span = error.get_span();
    let (line, line_text, column) = get_line_at_position(source, span.start.0);

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    let header = error.get_severity().to_string();
    let header = options.paint(severity_color(error.get_severity()), &header);
    let name = options.paint(BOLD, error.get_error_name());
    let _ = match error.get_tip() {
        ErrorTip::None => writeln!(out, "{}: {}: {}", header, name, error.get_message()),
        tip => writeln!(out, "{}: {} ({})", header, name, tip),
    };
    let _ = writeln!(out, "-> {}:{}:{}", span.file(), line, column + 1);
    let gutter = options.paint(BLUE, "|");
    let _ = writeln!(out, "{:>width$}", gutter, width = padding + gutter.len() - 1);

    let indent = line_text.len() - line_text.trim_start().len();
    let _ = writeln!(out, "{} {} {}", line_string, gutter, line_text.trim());

    let column = column.saturating_sub(indent);
    let visible = line_text.trim().len();
    let length = (span.end.0.saturating_sub(span.start.0) as usize)
        .min(visible.saturating_sub(column))
        .max(1);
    let carets = options.paint(severity_color(error.get_severity()), &"^".repeat(length));
    let _ = writeln!(
        out,
        "{:>width$} {}{}",
        gutter,
        " ".repeat(column),
        carets,
        width = padding + gutter.len() - 1
    );

    out
}

/// Renders an invariant violation that has no meaningful source location.
pub fn render_internal(message: &str, options: &RenderOptions) -> String {
    let header = options.paint(
        severity_color(Severity::Internal),
        &Severity::Internal.to_string(),
    );
    format!("{}: {}\nThis is a bug in spreadc, please report it.\n", header, message)
}
