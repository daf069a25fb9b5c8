//! Line alignment by content fingerprints.
//!
//! Both sides are walked with a cursor each. When the lines under the cursors
//! differ, the aligner looks ahead at most `window` lines on each side for the
//! nearest reappearance of the other side's line and emits the skipped lines
//! as one-sided rows. With no match in reach the two lines are paired.

use super::DiffLine;
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use tracing::trace;

/// Lookahead used when none is configured.
pub const DEFAULT_WINDOW: usize = 1000;

/// Fixed-length digest of a line: the first four bytes of its SHA-1.
///
/// Two different lines may share a fingerprint. The aligner then pairs them
/// as a modified line; classification always looks at the real content.
pub fn fingerprint(line: &str) -> u32 {
    let digest = Sha1::digest(line.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Ascending line positions per fingerprint for one side.
struct FingerprintIndex {
    prints: Vec<u32>,
    positions: HashMap<u32, Vec<usize>>,
}

impl FingerprintIndex {
    fn build<S: AsRef<str>>(lines: &[S]) -> Self {
        let prints: Vec<u32> = lines.iter().map(|l| fingerprint(l.as_ref())).collect();
        let mut positions: HashMap<u32, Vec<usize>> = HashMap::new();
        for (i, print) in prints.iter().enumerate() {
            positions.entry(*print).or_default().push(i);
        }
        Self { prints, positions }
    }

    /// Nearest position after `cursor` holding `print`, at most `window` away.
    fn next_within(&self, print: u32, cursor: usize, window: usize) -> Option<usize> {
        let positions = self.positions.get(&print)?;
        let idx = positions.partition_point(|&p| p <= cursor);
        positions
            .get(idx)
            .copied()
            .filter(|&p| p - cursor <= window)
    }
}

/// Align two line lists into one ordered stream of rows.
///
/// Lines are matched by fingerprint. When the current lines differ, the
/// aligner looks up to `window` lines ahead on each side for the other
/// side's current line and skips towards the closer hit, emitting the
/// skipped lines one-sided. With no hit on either side the current lines
/// are paired as a modification. A `window` of zero means [`DEFAULT_WINDOW`].
///
/// Every line of both inputs appears exactly once, in its original order.
///
/// ```
/// use coldiff::diff::{DiffCode, align_lines};
///
/// let rows = align_lines(&["a", "b", "c"], &["a", "c"], 0);
/// let codes: Vec<_> = rows.iter().map(|r| r.code).collect();
/// assert_eq!(codes, vec![DiffCode::Equal, DiffCode::Blocks(1), DiffCode::Equal]);
/// ```
pub fn align_lines<S: AsRef<str>>(a: &[S], b: &[S], window: usize) -> Vec<DiffLine> {
    let window = if window == 0 { DEFAULT_WINDOW } else { window };
    let a_index = FingerprintIndex::build(a);
    let b_index = FingerprintIndex::build(b);

    let mut rows = Vec::with_capacity(a.len().max(b.len()));
    let (mut ai, mut bi) = (0, 0);

    while ai < a.len() || bi < b.len() {
        let (Some(left), Some(right)) = (a.get(ai), b.get(bi)) else {
            rows.extend(a[ai..].iter().map(|l| DiffLine::deleted(l.as_ref())));
            rows.extend(b[bi..].iter().map(|l| DiffLine::inserted(l.as_ref())));
            break;
        };
        let (left, right) = (left.as_ref(), right.as_ref());
        let (left_print, right_print) = (a_index.prints[ai], b_index.prints[bi]);

        if left_print == right_print {
            push_pair(&mut rows, left, right, &mut ai, &mut bi);
            continue;
        }

        let in_b = b_index.next_within(left_print, bi, window);
        let in_a = a_index.next_within(right_print, ai, window);

        // Skip whichever side reaches its match sooner; ties delete from A
        let delete_to = match (in_b, in_a) {
            (Some(bj), Some(aj)) => (aj - ai <= bj - bi).then_some(aj),
            (None, in_a) => in_a,
            (Some(_), None) => None,
        };

        match (delete_to, in_b) {
            (Some(aj), _) => {
                rows.extend(a[ai..aj].iter().map(|l| DiffLine::deleted(l.as_ref())));
                ai = aj;
            }
            (None, Some(bj)) => {
                rows.extend(b[bi..bj].iter().map(|l| DiffLine::inserted(l.as_ref())));
                bi = bj;
            }
            (None, None) => {
                trace!(ai, bi, window, "no resynchronization point within window");
                push_pair(&mut rows, left, right, &mut ai, &mut bi);
            }
        }
    }

    rows
}

/// Emit `left` and `right` as one row.
///
/// A non-empty line paired with an empty one would look exactly like a pure
/// deletion once rendered, so it is emitted as a deletion instead and only
/// the left cursor moves.
fn push_pair(rows: &mut Vec<DiffLine>, left: &str, right: &str, ai: &mut usize, bi: &mut usize) {
    if right.is_empty() && !left.is_empty() {
        rows.push(DiffLine::deleted(left));
        *ai += 1;
        return;
    }
    rows.push(DiffLine::pair(left, right));
    *ai += 1;
    *bi += 1;
}
