//! Column-aligned diffs of texts and directory trees.
//!
//! The rendered output lines up both inputs side by side around a short
//! difference code, and the same text can be replayed with [`patch::apply`]
//! to turn the first input into the second.
//!
//! ```
//! use coldiff::{Options, compare};
//!
//! let out = compare("a\nb\nc", "a\nc", &Options::default());
//! assert_eq!(out, "a == a\nb 1d \nc == c\n");
//! ```

use error_set::error_set;
use std::path::Path;

pub mod diff;
pub mod fs;
pub mod header;
mod options;
pub mod patch;
pub mod render;
pub mod selection;
pub mod walk;

pub use options::{LineUp, Options, PathFilter};
pub use patch::{ApplyError, WriteError, apply};
pub use selection::{SelectionError, SelectionSet, parse_selection};
pub use walk::{InputError, diff_paths};

use fs::{FileSystem, LocalFs};
use selection::{limit_width, select_columns, select_lines};

error_set! {
    /// Top-level error for coldiff operations
    DiffError := {
        SelectionError(SelectionError),
        InputError(InputError),
        ApplyError(ApplyError),
    }
}

/// Compare two texts and render the aligned rows, without a header.
///
/// Both texts are split on `\n`, so a trailing newline gives a final empty
/// line. The line selection, line limit, column selection and width limit
/// of `opts` are applied in that order before aligning.
pub fn compare(a: &str, b: &str, opts: &Options) -> String {
    let a = prepare(a, opts, |set| &set.a);
    let b = prepare(b, opts, |set| &set.b);
    let rows = opts.align(&a, &b);
    render::render(&rows, opts.color())
}

/// [`compare`] the contents of two files.
pub fn compare_files(path1: &Path, path2: &Path, opts: &Options) -> Result<String, InputError> {
    compare_files_with(&LocalFs, path1, path2, opts)
}

/// [`compare_files`] against any [`FileSystem`].
pub fn compare_files_with<F: FileSystem>(
    fs: &F,
    path1: &Path,
    path2: &Path,
    opts: &Options,
) -> Result<String, InputError> {
    let a = fs.read_to_string(path1).map_err(|e| walk::unreadable(path1, e))?;
    let b = fs.read_to_string(path2).map_err(|e| walk::unreadable(path2, e))?;
    Ok(compare(&a, &b, opts))
}

fn prepare(
    text: &str,
    opts: &Options,
    side: impl Fn(&SelectionSet) -> &Vec<selection::Range>,
) -> Vec<String> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut lines = select_lines(&lines, side(opts.lines()));
    if let Some(limit) = opts.limit_lines() {
        lines.truncate(limit);
    }
    let lines = select_columns(&lines, side(opts.columns()));
    match opts.limit_width() {
        Some(width) => limit_width(&lines, width),
        None => lines,
    }
}
