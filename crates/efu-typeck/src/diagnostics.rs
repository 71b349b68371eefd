//! Diagnostic rendering.
//!
//! Every surfaced compiler error becomes one line:
//! `<file>:<line>:<col>: [ERROR] <message>`. The line/column pair is
//! resolved from the error's span through the file's [`LineIndex`].

use std::fmt;

use efu_common::span::{LineIndex, Span};

use crate::error::TypeError;

/// Render one diagnostic line for an arbitrary message at a span.
pub fn render_line(
    file: &str,
    index: &LineIndex,
    span: Span,
    message: impl fmt::Display,
) -> String {
    let (line, col) = index.line_col(span.start);
    format!("{file}:{line}:{col}: [ERROR] {message}")
}

/// Render one diagnostic line for a type error.
pub fn render_type_error(file: &str, index: &LineIndex, err: &TypeError) -> String {
    render_line(file, index, err.span(), err)
}
