//! Rendering aligned rows as canonical diff text.
//!
//! Each row becomes `<left padded> <code> <right>`. The left column is padded
//! to the widest left line of the batch, measured in characters, so the code
//! field lines up even when color escapes are mixed into the text.
//!
//! ```text
//! line1 == line1
//! line2 q  line2 modified
//! line3 == line3
//! ```

use crate::diff::{DiffCode, DiffLine, OpKind};
use colored::Color;

/// Render rows, one output line per row.
///
/// With `color` set, the code field is green for equal rows, yellow for
/// whitespace and line-ending changes and red otherwise. On changed rows,
/// deleted characters are red on the left and inserted characters green on
/// the right.
pub fn render(lines: &[DiffLine], color: bool) -> String {
    let width = lines
        .iter()
        .map(|line| line.left.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for line in lines {
        let (left, right) = if color {
            highlight(line)
        } else {
            (line.left.clone(), line.right.clone())
        };
        let field = format!(" {} ", line.code.field());

        out.push_str(&left);
        out.push_str(&" ".repeat(width - line.left.chars().count()));
        if color {
            out.push_str(&paint(&field, code_color(line.code)));
        } else {
            out.push_str(&field);
        }
        out.push_str(&right);
        out.push('\n');
    }
    out
}

fn code_color(code: DiffCode) -> Color {
    match code {
        DiffCode::Equal => Color::Green,
        DiffCode::Whitespace | DiffCode::LineEnding => Color::Yellow,
        _ => Color::Red,
    }
}

/// Wrap `text` in a foreground color escape.
///
/// Built from the palette directly so that output does not depend on whether
/// stdout is a terminal.
fn paint(text: &str, color: Color) -> String {
    format!("\x1b[{}m{}\x1b[0m", color.to_fg_str(), text)
}

/// Color deleted characters on the left and inserted ones on the right.
fn highlight(line: &DiffLine) -> (String, String) {
    if line.code == DiffCode::Equal || line.ops.is_empty() {
        return (line.left.clone(), line.right.clone());
    }

    let mut left = String::new();
    let mut right = String::new();
    for op in &line.ops {
        match op.kind {
            OpKind::Match => {
                left.push_str(&op.content);
                right.push_str(&op.content);
            }
            OpKind::Delete => {
                for ch in op.content.chars() {
                    left.push_str(&paint(&ch.to_string(), Color::Red));
                }
            }
            OpKind::Insert => {
                for ch in op.content.chars() {
                    right.push_str(&paint(&ch.to_string(), Color::Green));
                }
            }
        }
    }
    (left, right)
}
