//! Difference codes: the two-character summary rendered between the sides
//! of every row.

use super::edit::{OpKind, Operation, edit_script};
use std::fmt;

/// Two-character summary of how a pair of lines differs.
///
/// The textual form always fits a 2-character field. Block counts above nine
/// collapse to `+d` instead of widening the field, so the columns of the
/// rendered diff stay fixed for anything parsing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffCode {
    /// `==` - identical
    Equal,
    /// `1d`..`9d` - that many separate blocks of non-whitespace changes
    ///
    /// Build it with [`DiffCode::from_blocks`]. A count outside `1..=9`
    /// renders as `+d`.
    Blocks(u8),
    /// `+d` - ten or more blocks
    ManyBlocks,
    /// `w` - only whitespace changed
    Whitespace,
    /// `q` - whitespace and other characters changed
    Mixed,
    /// `$` - only line endings changed
    LineEnding,
}

const BLOCK_CODES: [&str; 9] = ["1d", "2d", "3d", "4d", "5d", "6d", "7d", "8d", "9d"];

impl DiffCode {
    /// Code for a non-whitespace change spread over `blocks` blocks.
    pub fn from_blocks(blocks: usize) -> Self {
        match u8::try_from(blocks) {
            Ok(n @ 1..=9) => Self::Blocks(n),
            _ => Self::ManyBlocks,
        }
    }

    /// The code without padding: `==`, `3d`, `+d`, `w`, `q` or `$`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::Blocks(n) => BLOCK_CODES
                .get(usize::from(*n).wrapping_sub(1))
                .copied()
                .unwrap_or("+d"),
            Self::ManyBlocks => "+d",
            Self::Whitespace => "w",
            Self::Mixed => "q",
            Self::LineEnding => "$",
        }
    }

    /// The code left-justified in its 2-character field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Whitespace => "w ",
            Self::Mixed => "q ",
            Self::LineEnding => "$ ",
            other => other.as_str(),
        }
    }

    /// Read a code back from the two characters of its field.
    pub fn from_field(first: char, second: char) -> Option<Self> {
        match (first, second) {
            ('=', '=') => Some(Self::Equal),
            ('+', 'd') => Some(Self::ManyBlocks),
            (digit @ '1'..='9', 'd') => digit
                .to_digit(10)
                .and_then(|n| u8::try_from(n).ok())
                .map(Self::Blocks),
            ('w', ' ') => Some(Self::Whitespace),
            ('q', ' ') => Some(Self::Mixed),
            ('$', ' ') => Some(Self::LineEnding),
            _ => None,
        }
    }
}

impl fmt::Display for DiffCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the difference between two lines.
///
/// Returns the code together with the edit script it was derived from. Equal
/// lines short-circuit with an empty script.
///
/// ```
/// use coldiff::diff::{DiffCode, classify};
///
/// assert_eq!(classify("abc", "axc").0, DiffCode::Blocks(1));
/// assert_eq!(classify("a b", "a  b").0, DiffCode::Whitespace);
/// assert_eq!(classify("", "").0, DiffCode::Equal);
/// ```
pub fn classify(left: &str, right: &str) -> (DiffCode, Vec<Operation>) {
    if left == right {
        return (DiffCode::Equal, Vec::new());
    }
    let ops = edit_script(left, right);
    (code_for(&ops), ops)
}

/// Reduce an edit script to its code.
pub fn code_for(ops: &[Operation]) -> DiffCode {
    let mut blocks = 0usize;
    let mut in_block = false;
    let mut text = false;
    let mut space = false;
    let mut eol = false;

    for op in ops {
        if op.kind == OpKind::Match {
            in_block = false;
            continue;
        }
        if !in_block {
            blocks += 1;
            in_block = true;
        }
        for ch in op.content.chars() {
            match ch {
                '\r' | '\n' => eol = true,
                c if c.is_whitespace() => space = true,
                _ => text = true,
            }
        }
    }

    match (blocks, text, space || eol) {
        (0, _, _) => DiffCode::Equal,
        (_, false, _) if eol && !space => DiffCode::LineEnding,
        (_, false, _) => DiffCode::Whitespace,
        (_, true, true) => DiffCode::Mixed,
        (n, true, false) => DiffCode::from_blocks(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use similar_asserts::assert_eq;

    fn code(a: &str, b: &str) -> DiffCode {
        classify(a, b).0
    }

    #[test]
    fn classify_examples() {
        let cases = [
            ("abc", "abc", DiffCode::Equal),
            ("abc", "axc", DiffCode::Blocks(1)),
            ("azcxe", "abcde", DiffCode::Blocks(2)),
            ("abcde", "azcxe", DiffCode::Blocks(2)),
            ("abc", "abd", DiffCode::Blocks(1)),
            ("   ", " \t ", DiffCode::Whitespace),
            ("a b", "a  b", DiffCode::Whitespace),
            ("a", "b", DiffCode::Blocks(1)),
            ("", "a", DiffCode::Blocks(1)),
            ("b", "", DiffCode::Blocks(1)),
            ("1.2.3.4", "1x2x3x4", DiffCode::Blocks(3)),
            (
                "1.2.3.4.5.6.7.8.9.10.11",
                "1x2x3x4x5x6x7x8x9x10x11",
                DiffCode::ManyBlocks,
            ),
            ("line2", "line2 modified", DiffCode::Mixed),
            ("text", "text\r", DiffCode::LineEnding),
            ("text", "text \r", DiffCode::Whitespace),
            ("", "", DiffCode::Equal),
        ];

        for (a, b, expected) in cases {
            assert_eq!(code(a, b), expected, "classify({a:?}, {b:?})");
        }
    }

    #[test]
    fn nine_blocks_is_still_counted() {
        assert_eq!(
            code("1.2.3.4.5.6.7.8.9.10", "1x2x3x4x5x6x7x8x9x10"),
            DiffCode::Blocks(9)
        );
    }

    #[test]
    fn equal_lines_have_no_operations() {
        assert!(classify("same", "same").1.is_empty());
    }

    #[test]
    fn from_blocks_saturates() {
        assert_eq!(DiffCode::from_blocks(1), DiffCode::Blocks(1));
        assert_eq!(DiffCode::from_blocks(9), DiffCode::Blocks(9));
        assert_eq!(DiffCode::from_blocks(10), DiffCode::ManyBlocks);
        assert_eq!(DiffCode::from_blocks(300), DiffCode::ManyBlocks);
        assert_eq!(DiffCode::Blocks(0).as_str(), "+d");
        assert_eq!(DiffCode::Blocks(12).field(), "+d");
    }

    #[test]
    fn fields_are_two_chars_and_parse_back() {
        let mut codes = vec![
            DiffCode::Equal,
            DiffCode::ManyBlocks,
            DiffCode::Whitespace,
            DiffCode::Mixed,
            DiffCode::LineEnding,
        ];
        codes.extend((1..=9).map(DiffCode::Blocks));

        for code in codes {
            let field: Vec<char> = code.field().chars().collect();
            assert_eq!(field.len(), 2, "{code}");
            assert_eq!(DiffCode::from_field(field[0], field[1]), Some(code));
        }
    }

    #[test]
    fn from_field_rejects_unknown() {
        assert_eq!(DiffCode::from_field('0', 'd'), None);
        assert_eq!(DiffCode::from_field('d', ' '), None);
        assert_eq!(DiffCode::from_field('w', 'w'), None);
    }

    proptest! {
        #[test]
        fn identical_lines_are_equal(line in ".{0,30}") {
            prop_assert_eq!(code(&line, &line), DiffCode::Equal);
        }

        #[test]
        fn different_lines_are_never_equal(a in "[a-c ]{0,8}", b in "[a-c ]{0,8}") {
            prop_assume!(a != b);
            prop_assert_ne!(code(&a, &b), DiffCode::Equal);
        }
    }
}
