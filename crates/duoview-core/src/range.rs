//! Positions and half-open ranges over lines and columns

use serde::{Deserialize, Serialize};

/// A 1-based (line, column) position in a text buffer.
///
/// Ordering is lexicographic: first by line, then by column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn is_before(&self, other: &Position) -> bool {
        self < other
    }

    pub fn is_before_or_equal(&self, other: &Position) -> bool {
        self <= other
    }
}

/// A half-open, 1-based interval of lines `[start, end_exclusive)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct LineRange {
    pub start: usize,
    pub end_exclusive: usize,
}

impl LineRange {
    /// Invariant: `start <= end_exclusive`.
    pub fn new(start: usize, end_exclusive: usize) -> Self {
        debug_assert!(start <= end_exclusive, "line range must not be inverted");
        Self {
            start,
            end_exclusive,
        }
    }

    pub fn of_length(start: usize, length: usize) -> Self {
        Self::new(start, start + length)
    }

    pub fn len(&self) -> usize {
        self.end_exclusive - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line < self.end_exclusive
    }

    /// Lines of the range, in order.
    pub fn lines(&self) -> impl Iterator<Item = usize> {
        self.start..self.end_exclusive
    }
}

/// A half-open interval of character columns within a single line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ColumnRange {
    pub start: usize,
    pub end_exclusive: usize,
}

impl ColumnRange {
    pub fn new(start: usize, end_exclusive: usize) -> Self {
        debug_assert!(start <= end_exclusive, "column range must not be inverted");
        Self {
            start,
            end_exclusive,
        }
    }

    pub fn len(&self) -> usize {
        self.end_exclusive - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A character-level range `(start..end)` ordered so `start <= end`.
///
/// A degenerate range (`start == end`) denotes an insertion point.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end, "text range must not be inverted");
        Self { start, end }
    }

    pub fn at(line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self::new(
            Position::new(line, start_column),
            Position::new(end_line, end_column),
        )
    }

    /// An insertion point at `position`.
    pub fn empty_at(position: Position) -> Self {
        Self::new(position, position)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }

    /// Column span of a single-line range; for multi-line ranges this
    /// is the span on the start line only and callers comparing
    /// against word-length limits treat multi-line as too long.
    pub fn length_in_columns(&self) -> usize {
        if self.is_single_line() {
            self.end.column - self.start.column
        } else {
            usize::MAX
        }
    }

    pub fn touches(&self, other: &TextRange) -> bool {
        self.end >= other.start && other.end >= self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering_is_lexicographic() {
        let a = Position::new(2, 9);
        let b = Position::new(3, 1);
        assert!(a.is_before(&b), "earlier line wins regardless of column");
        assert!(a.is_before_or_equal(&a));
        assert!(Position::new(3, 1).is_before(&Position::new(3, 2)));
    }

    #[test]
    fn test_line_range_length_and_containment() {
        let range = LineRange::new(10, 12);
        assert_eq!(range.len(), 2);
        assert!(!range.is_empty());
        assert!(range.contains(10));
        assert!(range.contains(11));
        assert!(!range.contains(12), "end is exclusive");

        let empty = LineRange::of_length(5, 0);
        assert!(empty.is_empty());
        assert!(!empty.contains(5));
    }

    #[test]
    fn test_text_range_insertion_point() {
        let point = TextRange::empty_at(Position::new(4, 7));
        assert!(point.is_empty());
        assert!(point.is_single_line());
        assert_eq!(point.length_in_columns(), 0);
    }

    #[test]
    fn test_text_range_touching() {
        let a = TextRange::at(1, 2, 1, 5);
        let b = TextRange::at(1, 5, 1, 8);
        let c = TextRange::at(1, 9, 1, 10);
        assert!(a.touches(&b), "adjacent ranges touch");
        assert!(!a.touches(&c));
    }
}
