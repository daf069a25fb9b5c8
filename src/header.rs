//! The non-row lines of canonical diff text: per-file headers and
//! kind-mismatch notices.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{escaped_transform, tag},
    character::complete::{char, none_of},
    combinator::{all_consuming, map, opt, value},
    sequence::delimited,
};
use std::fmt;

/// `Diff "<old>" "<new>"`, introducing the rows of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub old: String,
    pub new: String,
}

impl Header {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }

    /// Parse a complete header line.
    ///
    /// ```
    /// use coldiff::header::Header;
    ///
    /// let header = Header::parse(r#"Diff "a/x.txt" "b/x.txt""#).unwrap();
    /// assert_eq!(header, Header::new("a/x.txt", "b/x.txt"));
    /// ```
    pub fn parse(line: &str) -> Option<Self> {
        all_consuming(header).parse(line).ok().map(|(_, h)| h)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Diff {} {}", quote(&self.old), quote(&self.new))
    }
}

/// A path that is a file on one side and a directory on the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindMismatch {
    pub old: String,
    pub new: String,
    /// `true` when `old` is the directory
    pub old_is_dir: bool,
}

const DIR_THEN_FILE: (&str, &str) = (" is a directory while file ", " is a regular file");
const FILE_THEN_DIR: (&str, &str) = (" is a regular file while file ", " is a directory");

impl KindMismatch {
    pub fn parse(line: &str) -> Option<Self> {
        all_consuming(kind_mismatch).parse(line).ok().map(|(_, m)| m)
    }
}

impl fmt::Display for KindMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (middle, end) = if self.old_is_dir {
            DIR_THEN_FILE
        } else {
            FILE_THEN_DIR
        };
        write!(
            f,
            "File {}{middle}{}{end}",
            quote(&self.old),
            quote(&self.new)
        )
    }
}

/// Double-quote `s`, escaping backslashes, quotes and control whitespace.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Inverse of [`quote`].
fn quoted(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(
                none_of("\\\""),
                '\\',
                alt((
                    value("\\", char('\\')),
                    value("\"", char('"')),
                    value("\n", char('n')),
                    value("\r", char('r')),
                    value("\t", char('t')),
                )),
            )),
            Option::unwrap_or_default,
        ),
        char('"'),
    )
    .parse(input)
}

fn header(input: &str) -> IResult<&str, Header> {
    map(
        (tag("Diff "), quoted, char(' '), quoted),
        |(_, old, _, new)| Header { old, new },
    )
    .parse(input)
}

fn kind_mismatch(input: &str) -> IResult<&str, KindMismatch> {
    let dir_then_file = map(
        (
            tag("File "),
            quoted,
            tag(DIR_THEN_FILE.0),
            quoted,
            tag(DIR_THEN_FILE.1),
        ),
        |(_, old, _, new, _)| KindMismatch {
            old,
            new,
            old_is_dir: true,
        },
    );
    let file_then_dir = map(
        (
            tag("File "),
            quoted,
            tag(FILE_THEN_DIR.0),
            quoted,
            tag(FILE_THEN_DIR.1),
        ),
        |(_, old, _, new, _)| KindMismatch {
            old,
            new,
            old_is_dir: false,
        },
    );
    alt((dir_then_file, file_then_dir)).parse(input)
}
