//! Replaying rendered diff text onto files.
//!
//! A patch is the plain (uncolored) output of a comparison or a tree walk.
//! Every row is split at the column holding its difference code, and the
//! right-hand segments of the rows become the new content of the target
//! file. Blocks are written one at a time as the text is read, so a failure
//! part-way leaves the files of earlier blocks in place.

use crate::diff::{DiffCode, DiffLine, classify};
use crate::fs::{EntryKind, FileSystem, LocalFs};
use crate::header::{Header, KindMismatch};
use error_set::error_set;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

error_set! {
    /// Errors from applying a patch
    ApplyError := {
        #[display("Line {line}: malformed file header: {text}")]
        MalformedHeader { line: usize, text: String },
        #[display("Line {line}: no difference code field: {text}")]
        MissingCodeField { line: usize, text: String },
        #[display("Line {line}: diff rows before any file header and no target given")]
        RowsWithoutTarget { line: usize },
        #[display("Cannot resolve patch target '{path}'")]
        UnresolvableTarget { path: String },
    } || WriteError

    /// Errors from updating a target file
    WriteError := {
        #[display("Failed to write {path}: {message}")]
        WriteFailed { path: String, message: String },
        #[display("Failed to remove {path}: {message}")]
        RemoveFailed { path: String, message: String },
        #[display("Failed to create directory {path}: {message}")]
        CreateDirFailed { path: String, message: String },
    }
}

/// One rendered row split back into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Left segment without its padding
    pub left: String,
    pub code: DiffCode,
    pub right: String,
}

impl Row {
    /// Whether the row carries a line of the second input.
    ///
    /// Deletions render with an empty right segment. An equal row whose two
    /// sides are both empty is a real empty line.
    pub fn contributes(&self) -> bool {
        self.code == DiffCode::Equal || !self.right.is_empty()
    }
}

/// Split a single row at the first column that holds a code field.
///
/// ```
/// use coldiff::diff::DiffCode;
/// use coldiff::patch::parse_row;
///
/// let row = parse_row("hello 1d help").unwrap();
/// assert_eq!(row.code, DiffCode::Blocks(1));
/// assert_eq!(row.right, "help");
/// ```
pub fn parse_row(line: &str) -> Option<Row> {
    let chars: Vec<char> = line.chars().collect();
    (0..chars.len()).find_map(|col| row_at(&chars, col))
}

/// The content of the second input described by `rows`.
///
/// `None` means the second input has no lines at all, so the file should not
/// exist.
pub fn reconstruct(rows: &[Row]) -> Option<String> {
    let lines: Vec<&str> = rows
        .iter()
        .filter(|row| row.contributes())
        .map(|row| row.right.as_str())
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Apply `patch` to files below `root`.
///
/// Header paths are resolved against `root`, and an absolute header path is
/// placed below `root` as if it were relative. Rows that come before the first
/// header are written to `implicit`, which lets the output of a single-file
/// comparison be applied. Returns the paths that were written or removed.
pub fn apply(
    patch: &str,
    root: &Path,
    implicit: Option<&Path>,
) -> Result<Vec<PathBuf>, ApplyError> {
    apply_with(&LocalFs, patch, root, implicit)
}

/// [`apply`] against any [`FileSystem`].
pub fn apply_with<F: FileSystem>(
    fs: &F,
    patch: &str,
    root: &Path,
    implicit: Option<&Path>,
) -> Result<Vec<PathBuf>, ApplyError> {
    let mut touched = Vec::new();
    let mut pending = implicit
        .map(|path| resolve(root, path))
        .transpose()?
        .map(Pending::implicit);

    for (idx, line) in split_lines(patch).enumerate() {
        let number = idx + 1;

        if line.starts_with("Diff \"") {
            match Header::parse(line) {
                Some(header) => {
                    if let Some(block) = pending.take() {
                        block.flush(fs, &mut touched)?;
                    }
                    debug!(old = %header.old, new = %header.new, "file header");
                    pending = Some(Pending::headed(resolve(root, Path::new(&header.old))?));
                    continue;
                }
                // Compared text may itself start with a header
                None if pending.is_some() && parse_row(line).is_some() => {}
                None => {
                    if let Some(block) = pending.take() {
                        block.flush(fs, &mut touched)?;
                    }
                    return Err(ApplyError::MalformedHeader {
                        line: number,
                        text: line.to_string(),
                    });
                }
            }
        }

        if let Some(notice) = KindMismatch::parse(line) {
            warn!(old = %notice.old, new = %notice.new, "skipping file/directory mismatch");
            continue;
        }

        match pending.as_mut() {
            Some(block) => block.rows.push((number, line)),
            None => return Err(ApplyError::RowsWithoutTarget { line: number }),
        }
    }

    if let Some(block) = pending {
        block.flush(fs, &mut touched)?;
    }
    Ok(touched)
}

/// Rows collected for one target file.
struct Pending<'a> {
    target: PathBuf,
    /// A header with no rows still describes an absent file; the implicit
    /// target is only touched once rows arrive.
    headed: bool,
    rows: Vec<(usize, &'a str)>,
}

impl Pending<'_> {
    fn implicit(target: PathBuf) -> Self {
        Self {
            target,
            headed: false,
            rows: Vec::new(),
        }
    }

    fn headed(target: PathBuf) -> Self {
        Self {
            target,
            headed: true,
            rows: Vec::new(),
        }
    }

    fn flush<F: FileSystem>(self, fs: &F, touched: &mut Vec<PathBuf>) -> Result<(), ApplyError> {
        if !self.headed && self.rows.is_empty() {
            return Ok(());
        }

        let rows = parse_block(&self.rows)?;
        let path = self.target.display().to_string();
        match reconstruct(&rows) {
            Some(content) => {
                if let Some(parent) = self.target.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs.create_dir_all(parent)
                        .map_err(|e| WriteError::CreateDirFailed {
                            path: parent.display().to_string(),
                            message: e.to_string(),
                        })?;
                }
                debug!(path = %path, rows = rows.len(), "writing patched file");
                fs.write(&self.target, &content)
                    .map_err(|e| WriteError::WriteFailed {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                touched.push(self.target);
            }
            None => {
                let kind = fs.kind(&self.target).map_err(|e| WriteError::RemoveFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                if kind == Some(EntryKind::File) {
                    debug!(path = %path, "removing file absent from the second input");
                    fs.remove_file(&self.target)
                        .map_err(|e| WriteError::RemoveFailed {
                            path: path.clone(),
                            message: e.to_string(),
                        })?;
                    touched.push(self.target);
                }
            }
        }
        Ok(())
    }
}

/// Lines of the patch text. A trailing newline does not start another line,
/// and carriage returns stay part of the row.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let body = text.strip_suffix('\n').unwrap_or(text);
    (!body.is_empty())
        .then(|| body.split('\n'))
        .into_iter()
        .flatten()
}

/// Place `path` below `root`. Absolute paths lose their root, so every
/// target stays inside `root`.
fn resolve(root: &Path, path: &Path) -> Result<PathBuf, ApplyError> {
    let unresolvable = || ApplyError::UnresolvableTarget {
        path: path.display().to_string(),
    };
    let mut relative = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::ParentDir => return Err(unresolvable()),
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
        }
    }
    if relative.as_os_str().is_empty() {
        return Err(unresolvable());
    }
    Ok(root.join(relative))
}

/// Split every row of a block at the column they all share.
fn parse_block(lines: &[(usize, &str)]) -> Result<Vec<Row>, ApplyError> {
    let rows: Vec<Vec<char>> = lines.iter().map(|(_, l)| l.chars().collect()).collect();
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };

    let shortest = rows.iter().map(Vec::len).min().unwrap_or(0);
    let shared = (0..shortest).find(|&col| rows.iter().all(|r| row_at(r, col).is_some()));

    match shared {
        Some(col) => Ok(rows.iter().filter_map(|r| row_at(r, col)).collect()),
        None => {
            // Blame the first row that disagrees with the first row's column
            let offending = (0..first.len())
                .find(|&col| row_at(first, col).is_some())
                .and_then(|col| rows.iter().position(|r| row_at(r, col).is_none()))
                .unwrap_or(0);
            let (line, text) = lines[offending];
            Err(ApplyError::MissingCodeField {
                line,
                text: text.to_string(),
            })
        }
    }
}

/// The code whose field starts at `col`, if the row has one there.
///
/// The field is a space, two code characters and a separating space. The
/// separator may be missing at the end of the row, and so may the padding
/// of a one-character code.
fn code_at(chars: &[char], col: usize) -> Option<DiffCode> {
    if chars.get(col) != Some(&' ') {
        return None;
    }
    let first = *chars.get(col + 1)?;
    let second = chars.get(col + 2).copied().unwrap_or(' ');
    let code = DiffCode::from_field(first, second)?;
    matches!(chars.get(col + 3), None | Some(' ')).then_some(code)
}

fn row_at(chars: &[char], col: usize) -> Option<Row> {
    let code = code_at(chars, col)?;
    let left: String = chars[..col].iter().collect();
    let right: String = chars
        .get(col + 4..)
        .map(|rest| rest.iter().collect())
        .unwrap_or_default();

    if code == DiffCode::Equal {
        // Equal rows repeat the left text on the right
        let padding = left.strip_prefix(right.as_str())?;
        if !padding.chars().all(|c| c == ' ') {
            return None;
        }
        return Some(Row {
            left: right.clone(),
            code,
            right,
        });
    }

    // The left text may end in spaces of its own; take the shortest reading
    // whose classification matches the code
    let trimmed = left.trim_end_matches(' ');
    let padding = left.len() - trimmed.len();
    let left = (0..=padding)
        .map(|spaces| format!("{trimmed}{}", " ".repeat(spaces)))
        .find(|candidate| expected_code(candidate, &right) == code)?;

    Some(Row { left, code, right })
}

/// The code the aligner gives a row with these two sides.
fn expected_code(left: &str, right: &str) -> DiffCode {
    if right.is_empty() {
        DiffLine::deleted(left).code
    } else {
        classify(left, right).0
    }
}
