use crate::diff::{DEFAULT_WINDOW, DiffLine, align_lines};
use crate::selection::SelectionSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Decides from a path relative to the comparison root whether a file is
/// compared.
pub type PathFilter = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// Lines up two sequences of lines into rows, given the lookahead window.
/// It stands in for [`align_lines`] in every comparison.
pub type LineUp = Arc<dyn Fn(&[String], &[String], usize) -> Vec<DiffLine> + Send + Sync>;

/// Settings for one comparison, fixed once built.
///
/// ```
/// use coldiff::Options;
///
/// let opts = Options::default().with_window(50).with_color(true);
/// assert_eq!(opts.window(), 50);
/// assert!(opts.color());
/// ```
#[derive(Clone, Default)]
pub struct Options {
    window: usize,
    limit_lines: Option<usize>,
    limit_width: Option<usize>,
    lines: SelectionSet,
    columns: SelectionSet,
    color: bool,
    filter: Option<PathFilter>,
    line_up: Option<LineUp>,
}

impl Options {
    /// How far past the cursors the aligner looks for a matching line.
    /// Zero selects the default.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_limit_lines(mut self, limit: Option<usize>) -> Self {
        self.limit_lines = limit;
        self
    }

    pub fn with_limit_width(mut self, limit: Option<usize>) -> Self {
        self.limit_width = limit;
        self
    }

    /// Line ranges kept before comparing.
    pub fn with_lines(mut self, lines: SelectionSet) -> Self {
        self.lines = lines;
        self
    }

    /// Character column ranges kept on every line before comparing.
    pub fn with_columns(mut self, columns: SelectionSet) -> Self {
        self.columns = columns;
        self
    }

    /// Colorize rendered output with ANSI escapes.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Replace the line aligner. Rows it returns are rendered as they are,
    /// so their codes should agree with [`crate::diff::classify`] for the
    /// output to stay applicable.
    pub fn with_line_up<F>(mut self, line_up: F) -> Self
    where
        F: Fn(&[String], &[String], usize) -> Vec<DiffLine> + Send + Sync + 'static,
    {
        self.line_up = Some(Arc::new(line_up));
        self
    }

    pub fn window(&self) -> usize {
        if self.window == 0 {
            DEFAULT_WINDOW
        } else {
            self.window
        }
    }

    pub fn limit_lines(&self) -> Option<usize> {
        self.limit_lines
    }

    pub fn limit_width(&self) -> Option<usize> {
        self.limit_width
    }

    pub fn lines(&self) -> &SelectionSet {
        &self.lines
    }

    pub fn columns(&self) -> &SelectionSet {
        &self.columns
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Whether the file at `rel` takes part in a tree comparison. The empty
    /// path, naming the root itself, always does.
    pub fn accepts(&self, rel: &Path) -> bool {
        if rel.as_os_str().is_empty() {
            return true;
        }
        self.filter.as_ref().is_none_or(|filter| filter(rel))
    }

    /// Align two sequences of lines with the configured aligner.
    pub fn align(&self, a: &[String], b: &[String]) -> Vec<DiffLine> {
        match &self.line_up {
            Some(line_up) => line_up(a, b, self.window()),
            None => align_lines(a, b, self.window()),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("window", &self.window())
            .field("limit_lines", &self.limit_lines)
            .field("limit_width", &self.limit_width)
            .field("lines", &self.lines)
            .field("columns", &self.columns)
            .field("color", &self.color)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .field("line_up", &self.line_up.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
