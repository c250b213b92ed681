//! Source location tracking

use std::fmt;

/// A span represents a range in the text handed to the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Start character offset
    pub start: usize,
    /// End character offset (exclusive)
    pub end: usize,
    /// 1-based line of the start offset
    pub line: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }

    /// Create a dummy span (for synthesized nodes)
    pub fn dummy() -> Self {
        Self { start: 0, end: 0, line: 0 }
    }

    /// Check whether `other` starts exactly where this span ends
    pub fn touches(&self, other: &Span) -> bool {
        self.end == other.start
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::dummy()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}
