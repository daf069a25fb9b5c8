//! Line alignment and intra-line classification.

mod align;
mod code;
mod edit;

pub use align::{DEFAULT_WINDOW, align_lines, fingerprint};
pub use code::{DiffCode, classify, code_for};
pub use edit::{OpKind, Operation, edit_script};

/// One row of an aligned diff.
///
/// A one-sided row carries an empty string on the missing side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub left: String,
    pub right: String,
    pub code: DiffCode,
    /// Character edits from `left` to `right`; empty when the texts are equal
    pub ops: Vec<Operation>,
}

impl DiffLine {
    /// A line present on both sides.
    pub fn pair(left: &str, right: &str) -> Self {
        let (code, ops) = classify(left, right);
        Self {
            left: left.to_string(),
            right: right.to_string(),
            code,
            ops,
        }
    }

    /// A line present only in the first input.
    ///
    /// Deleting an empty line only removes a line break, so it is coded as a
    /// line-ending change rather than as equal.
    pub fn deleted(left: &str) -> Self {
        if left.is_empty() {
            return Self {
                left: String::new(),
                right: String::new(),
                code: DiffCode::LineEnding,
                ops: Vec::new(),
            };
        }
        Self::pair(left, "")
    }

    /// A line present only in the second input.
    pub fn inserted(right: &str) -> Self {
        Self::pair("", right)
    }
}
