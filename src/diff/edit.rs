//! Character-level edit scripts.

/// What an [`Operation`] does to the first sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Present in both sequences
    Match,
    /// Present only in the second sequence
    Insert,
    /// Present only in the first sequence
    Delete,
}

/// A run of one or more characters sharing the same [`OpKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub kind: OpKind,
    pub content: String,
}

impl Operation {
    pub fn new(kind: OpKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// Compute a shortest edit script turning `old` into `new`.
///
/// Works on Unicode scalar values, not bytes, using a longest common
/// subsequence table. When backtracking hits a tie, insertion is preferred,
/// which places deletions before insertions inside every changed region.
/// Adjacent operations of the same kind are merged into one run.
///
/// Concatenating the `Match` and `Delete` runs gives back `old`; the `Match`
/// and `Insert` runs give back `new`.
///
/// ```
/// use coldiff::diff::{OpKind, Operation, edit_script};
///
/// assert_eq!(
///     edit_script("abc", "axc"),
///     vec![
///         Operation::new(OpKind::Match, "a"),
///         Operation::new(OpKind::Delete, "b"),
///         Operation::new(OpKind::Insert, "x"),
///         Operation::new(OpKind::Match, "c"),
///     ]
/// );
/// ```
pub fn edit_script(old: &str, new: &str) -> Vec<Operation> {
    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();
    let (n, m) = (a.len(), b.len());
    let width = m + 1;

    // table[i * width + j] = LCS length of a[..i] and b[..j]
    let mut table = vec![0u32; (n + 1) * width];
    for i in 1..=n {
        for j in 1..=m {
            table[i * width + j] = if a[i - 1] == b[j - 1] {
                table[(i - 1) * width + j - 1] + 1
            } else {
                table[(i - 1) * width + j].max(table[i * width + j - 1])
            };
        }
    }

    let mut backwards = Vec::with_capacity(n + m);
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && a[i - 1] == b[j - 1] {
            backwards.push((OpKind::Match, a[i - 1]));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || table[i * width + j - 1] >= table[(i - 1) * width + j]) {
            backwards.push((OpKind::Insert, b[j - 1]));
            j -= 1;
        } else {
            backwards.push((OpKind::Delete, a[i - 1]));
            i -= 1;
        }
    }

    let mut ops: Vec<Operation> = Vec::new();
    for (kind, ch) in backwards.into_iter().rev() {
        match ops.last_mut() {
            Some(last) if last.kind == kind => last.content.push(ch),
            _ => ops.push(Operation::new(kind, ch)),
        }
    }
    ops
}
