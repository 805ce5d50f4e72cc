//! Source location types
//!
//! These types represent positions in source code. Line/column coordinates
//! drive reporting; byte offsets drive patch application.

use serde::{Deserialize, Serialize};

/// Single location in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Span in source code
///
/// Lines are 1-based, columns and byte offsets 0-based. Byte offsets are
/// relative to the text the span was measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
    pub start_byte: u32,
    pub end_byte: u32,
}

impl Span {
    pub fn new(
        start_line: u32,
        start_col: u32,
        end_line: u32,
        end_col: u32,
        start_byte: u32,
        end_byte: u32,
    ) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
            start_byte,
            end_byte,
        }
    }

    /// Create a zero span (0:0-0:0)
    pub fn zero() -> Self {
        Self::new(0, 0, 0, 0, 0, 0)
    }

    /// Create an empty span at a single point (insertion point)
    pub fn point(line: u32, col: u32, byte: u32) -> Self {
        Self::new(line, col, line, col, byte, byte)
    }

    pub fn contains_line(&self, line: u32) -> bool {
        self.start_line <= line && line <= self.end_line
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }

    /// Strict byte-range overlap. Empty spans never overlap anything.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start_byte < other.end_byte && other.start_byte < self.end_byte
    }

    pub fn is_empty(&self) -> bool {
        self.start_byte == self.end_byte
    }

    pub fn byte_len(&self) -> usize {
        (self.end_byte.saturating_sub(self.start_byte)) as usize
    }

    pub fn line_count(&self) -> u32 {
        if self.end_line >= self.start_line {
            self.end_line - self.start_line + 1
        } else {
            0
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_col, self.end_line, self.end_col
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_contains_line() {
        let span = Span::new(10, 0, 20, 0, 100, 300);
        assert!(span.contains_line(10));
        assert!(span.contains_line(15));
        assert!(span.contains_line(20));
        assert!(!span.contains_line(9));
        assert!(!span.contains_line(21));
    }

    #[test]
    fn test_span_overlap_strict() {
        let a = Span::new(1, 0, 1, 4, 0, 4);
        let b = Span::new(1, 2, 1, 8, 2, 8);
        let c = Span::new(1, 4, 1, 8, 4, 8);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c)); // touching, not overlapping
    }

    #[test]
    fn test_empty_span_never_overlaps() {
        let point = Span::point(1, 2, 2);
        let covering = Span::new(1, 0, 1, 8, 0, 8);
        assert!(point.is_empty());
        assert!(!point.overlaps(&covering));
        assert!(!covering.overlaps(&point));
    }

    #[test]
    fn test_span_line_count() {
        let span = Span::new(10, 0, 20, 0, 0, 0);
        assert_eq!(span.line_count(), 11);
    }
}
