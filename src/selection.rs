//! Parsing and applying the range selection mini-language.
//!
//! A selection narrows the lines (or the columns of every line) that take part
//! in a comparison. Selections are compiled once, before alignment runs, so a
//! syntax error never leaves a half-finished comparison behind.
//!
//! # Syntax
//!
//! A selection is a comma-separated list of tokens `[a:|b:]START[-END]`:
//! - `a:` / `b:` - the range applies only to the first / second input
//! - no label - a single unlabeled token applies to both inputs; two unlabeled
//!   tokens apply to the first and then the second input
//! - `START-END` - 1-based, inclusive; `START` alone selects one line
//!
//! # Examples
//!
//! ```
//! use coldiff::selection::{Range, parse_selection};
//!
//! let selection = parse_selection("a:1-8,b:2-9").unwrap();
//! assert_eq!(selection.a, vec![Range::new(1, 8).unwrap()]);
//! assert_eq!(selection.b, vec![Range::new(2, 9).unwrap()]);
//!
//! // One unlabeled token selects the same window on both sides
//! let selection = parse_selection("3-4").unwrap();
//! assert_eq!(selection.a, selection.b);
//! ```

use error_set::error_set;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{all_consuming, opt, value},
    sequence::preceded,
};
use std::fmt;
use std::str::FromStr;

error_set! {
    /// Errors from compiling a selection string
    SelectionError := {
        /// Token does not follow `[a:|b:]START[-END]`
        #[display("Invalid selection token '{token}'")]
        InvalidToken { token: String },
        /// Number is zero or does not fit a line index
        #[display("Invalid line number '{value}'")]
        InvalidLineNumber { value: String },
        /// Range has start greater than end
        #[display("Invalid range {start}-{end}: start must be <= end")]
        InvalidRange { start: usize, end: usize },
        /// More than two unlabeled tokens
        #[display("Unexpected unlabeled range '{token}': at most two are allowed")]
        TooManyPositional { token: String },
    }
}

/// An inclusive, 1-based window of lines or columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    start: usize,
    end: usize,
}

impl Range {
    /// Create a range, rejecting zero and inverted bounds.
    pub fn new(start: usize, end: usize) -> Result<Self, SelectionError> {
        if start == 0 {
            return Err(SelectionError::InvalidLineNumber {
                value: start.to_string(),
            });
        }
        if start > end {
            return Err(SelectionError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Zero-based half-open bounds clamped to `len`, or `None` when the range
    /// starts past the end.
    fn clamp(&self, len: usize) -> Option<std::ops::Range<usize>> {
        let start = self.start - 1;
        (start < len).then(|| start..self.end.min(len))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Ranges for each side of a comparison. An empty side selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    pub a: Vec<Range>,
    pub b: Vec<Range>,
}

impl SelectionSet {
    pub fn is_empty(&self) -> bool {
        self.a.is_empty() && self.b.is_empty()
    }
}

impl FromStr for SelectionSet {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selection(s)
    }
}

/// Renders every token with its side label, so the output parses back to the
/// same selection.
impl fmt::Display for SelectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens = self
            .a
            .iter()
            .map(|r| format!("a:{r}"))
            .chain(self.b.iter().map(|r| format!("b:{r}")))
            .collect::<Vec<_>>();
        f.write_str(&tokens.join(","))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Side {
    A,
    B,
}

/// Compile a selection string.
///
/// # Errors
///
/// Returns [`SelectionError`] if:
/// - A token is not `[a:|b:]START[-END]`
/// - A bound is zero or too large
/// - A range has start greater than end
/// - More than two unlabeled tokens are given
pub fn parse_selection(input: &str) -> Result<SelectionSet, SelectionError> {
    let mut selection = SelectionSet::default();
    let mut positional = Vec::new();

    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (side, range) = parse_token(part)?;
        match side {
            Some(Side::A) => selection.a.push(range),
            Some(Side::B) => selection.b.push(range),
            None => positional.push((part, range)),
        }
    }

    match positional.as_slice() {
        [] => {}
        [(_, both)] => {
            selection.a.push(*both);
            selection.b.push(*both);
        }
        [(_, first), (_, second)] => {
            selection.a.push(*first);
            selection.b.push(*second);
        }
        [_, _, (extra, _), ..] => {
            return Err(SelectionError::TooManyPositional {
                token: extra.to_string(),
            });
        }
    }

    Ok(selection)
}

/// `[a:|b:]START[-END]`
fn token(input: &str) -> IResult<&str, (Option<Side>, &str, Option<&str>)> {
    (
        opt(alt((value(Side::A, tag("a:")), value(Side::B, tag("b:"))))),
        digit1,
        opt(preceded(char('-'), digit1)),
    )
        .parse(input)
}

fn parse_token(part: &str) -> Result<(Option<Side>, Range), SelectionError> {
    let (_, (side, start, end)) =
        all_consuming(token)
            .parse(part)
            .map_err(|_| SelectionError::InvalidToken {
                token: part.to_string(),
            })?;

    let start = parse_number(start)?;
    let end = end.map(parse_number).transpose()?.unwrap_or(start);
    Ok((side, Range::new(start, end)?))
}

fn parse_number(digits: &str) -> Result<usize, SelectionError> {
    digits
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| SelectionError::InvalidLineNumber {
            value: digits.to_string(),
        })
}

/// Concatenate the lines covered by each range, in range order.
///
/// Ranges are clamped to the input; a range starting past the end selects
/// nothing. No ranges selects every line.
pub fn select_lines<S: Clone>(lines: &[S], ranges: &[Range]) -> Vec<S> {
    if ranges.is_empty() {
        return lines.to_vec();
    }
    ranges
        .iter()
        .filter_map(|r| r.clamp(lines.len()))
        .flat_map(|window| lines[window].iter().cloned())
        .collect()
}

/// Concatenate, per line, the characters covered by each range.
pub fn select_columns<S: AsRef<str>>(lines: &[S], ranges: &[Range]) -> Vec<String> {
    lines
        .iter()
        .map(|line| {
            let line = line.as_ref();
            if ranges.is_empty() {
                return line.to_string();
            }
            let chars: Vec<char> = line.chars().collect();
            ranges
                .iter()
                .filter_map(|r| r.clamp(chars.len()))
                .flat_map(|window| chars[window].iter())
                .collect()
        })
        .collect()
}

/// Truncate every line to at most `width` characters.
pub fn limit_width<S: AsRef<str>>(lines: &[S], width: usize) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.as_ref().chars().take(width).collect())
        .collect()
}
