//! Content oracle for line-based text buffers

use crate::range::{Position, TextRange};

/// Read access to a line-based document.
///
/// The alignment and presentation code never owns a document; callers
/// hand in whatever implements this. Out-of-range lines read as empty
/// rather than panicking, so a stale diff can probe past the end and
/// the caller-facing fail-soft policy stays intact.
pub trait LineSource {
    fn line_count(&self) -> usize;

    /// Content of a 1-based line, without its terminating newline.
    /// Returns `""` for lines outside the document.
    fn line_content(&self, line: usize) -> &str;

    /// One past the last character column of a line (chars + 1).
    fn line_max_column(&self, line: usize) -> usize {
        self.line_content(line).chars().count() + 1
    }

    /// Text covered by `range`, with `\n` separating spanned lines.
    fn value_of_range(&self, range: &TextRange) -> String {
        if range.is_empty() {
            return String::new();
        }
        if range.is_single_line() {
            return slice_columns(
                self.line_content(range.start.line),
                range.start.column,
                range.end.column,
            );
        }
        let mut out = String::new();
        let first = self.line_content(range.start.line);
        out.push_str(&slice_columns(
            first,
            range.start.column,
            first.chars().count() + 1,
        ));
        for line in range.start.line + 1..range.end.line {
            out.push('\n');
            out.push_str(self.line_content(line));
        }
        out.push('\n');
        out.push_str(&slice_columns(
            self.line_content(range.end.line),
            1,
            range.end.column,
        ));
        out
    }
}

/// Char-column slice of a line, `[start, end)`, 1-based.
fn slice_columns(content: &str, start: usize, end: usize) -> String {
    content
        .chars()
        .skip(start.saturating_sub(1))
        .take(end.saturating_sub(start))
        .collect()
}

/// A simple owned document: one `String` per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextModel {
    lines: Vec<String>,
}

impl TextModel {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Position just past the last character of the document.
    pub fn end_position(&self) -> Position {
        let line = self.line_count().max(1);
        Position::new(line, self.line_max_column(line))
    }
}

impl LineSource for TextModel {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_content(&self, line: usize) -> &str {
        line.checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::TextRange;

    #[test]
    fn test_line_access_is_one_based_and_fail_soft() {
        let model = TextModel::from_text("alpha\nbeta");
        assert_eq!(model.line_count(), 2);
        assert_eq!(model.line_content(1), "alpha");
        assert_eq!(model.line_content(2), "beta");
        assert_eq!(model.line_content(0), "", "line 0 does not exist");
        assert_eq!(model.line_content(3), "", "past-the-end reads as empty");
        assert_eq!(model.line_max_column(1), 6);
        assert_eq!(model.line_max_column(99), 1);
    }

    #[test]
    fn test_value_of_single_line_range() {
        let model = TextModel::from_text("hello world");
        let range = TextRange::at(1, 7, 1, 12);
        assert_eq!(model.value_of_range(&range), "world");
        assert_eq!(model.value_of_range(&TextRange::at(1, 3, 1, 3)), "");
    }

    #[test]
    fn test_value_of_multi_line_range() {
        let model = TextModel::from_text("one\ntwo\nthree");
        let range = TextRange::at(1, 3, 3, 3);
        assert_eq!(model.value_of_range(&range), "e\ntwo\nth");
    }

    #[test]
    fn test_value_of_range_with_multibyte_chars() {
        let model = TextModel::from_text("héllo");
        let range = TextRange::at(1, 2, 1, 4);
        assert_eq!(model.value_of_range(&range), "él", "columns count chars, not bytes");
    }
}
