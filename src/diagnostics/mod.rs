pub mod diagnostics;

pub use diagnostics::{get_line_at_position, render, render_internal, RenderOptions};

#[cfg(test)]
mod tests;
