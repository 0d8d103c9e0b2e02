//! Text replacements and boundary growing
//!
//! A raw character-level edit often cuts through the middle of a
//! token; before rendering it as a word bubble it is grown outward to
//! a semantic boundary (word or whitespace run) and touching results
//! are merged, so the overlay never shows a confusing partial-token
//! diff.

use crate::model::LineSource;
use crate::range::{Position, TextRange};
use serde::{Deserialize, Serialize};

/// An immutable single edit: replace `range` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextReplacement {
    pub range: TextRange,
    pub new_text: String,
}

impl TextReplacement {
    pub fn new(range: TextRange, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }

    /// Applies this replacement to `source` and returns the full
    /// resulting text.
    pub fn apply_to(&self, source: &impl LineSource) -> String {
        let mut out = String::new();
        for line in 1..self.range.start.line {
            out.push_str(source.line_content(line));
            out.push('\n');
        }
        let start_line = source.line_content(self.range.start.line);
        out.extend(start_line.chars().take(self.range.start.column - 1));
        out.push_str(&self.new_text);
        let end_line = source.line_content(self.range.end.line);
        out.extend(end_line.chars().skip(self.range.end.column - 1));
        for line in self.range.end.line + 1..=source.line_count() {
            out.push('\n');
            out.push_str(source.line_content(line));
        }
        out
    }
}

/// Combines two ordered replacements into one, concatenating the
/// original text between them. Never drops content.
pub fn join_replacements(
    first: TextReplacement,
    second: TextReplacement,
    source: &impl LineSource,
) -> TextReplacement {
    let between = if first.range.end < second.range.start {
        source.value_of_range(&TextRange::new(first.range.end, second.range.start))
    } else {
        String::new()
    };
    let end = first.range.end.max(second.range.end);
    TextReplacement {
        range: TextRange::new(first.range.start, end),
        new_text: format!("{}{}{}", first.new_text, between, second.new_text),
    }
}

/// Grows every replacement outward while the adjacent original
/// character satisfies `is_boundary`, keeping the boundary characters
/// verbatim in the replacement text. Growth stops at a neighboring
/// replacement's range, so two grown edits can touch but never claim
/// the same original character twice; touching results merge into one
/// replacement.
pub fn grow_edits<S: LineSource>(
    mut replacements: Vec<TextReplacement>,
    source: &S,
    is_boundary: impl Fn(char) -> bool,
) -> Vec<TextReplacement> {
    replacements.sort_by(|a, b| a.range.start.cmp(&b.range.start));
    let next_starts: Vec<Position> = replacements.iter().map(|r| r.range.start).collect();

    let mut result: Vec<TextReplacement> = Vec::new();
    for (idx, replacement) in replacements.into_iter().enumerate() {
        let left_limit = result.last().map(|prev| prev.range.end);
        let right_limit = next_starts.get(idx + 1).copied();
        let grown = grow_one(replacement, source, &is_boundary, left_limit, right_limit);
        match result.pop() {
            Some(previous) if previous.range.end >= grown.range.start => {
                result.push(join_replacements(previous, grown, source));
            }
            Some(previous) => {
                result.push(previous);
                result.push(grown);
            }
            None => result.push(grown),
        }
    }
    result
}

fn grow_one<S: LineSource>(
    replacement: TextReplacement,
    source: &S,
    is_boundary: &impl Fn(char) -> bool,
    left_limit: Option<Position>,
    right_limit: Option<Position>,
) -> TextReplacement {
    let mut range = replacement.range;
    let mut text = replacement.new_text;

    let start_line: Vec<char> = source.line_content(range.start.line).chars().collect();
    while range.start.column > 1 {
        if left_limit.is_some_and(|limit| range.start <= limit) {
            break;
        }
        let c = start_line[range.start.column - 2];
        if !is_boundary(c) {
            break;
        }
        range.start.column -= 1;
        text.insert(0, c);
    }

    let end_line: Vec<char> = source.line_content(range.end.line).chars().collect();
    while range.end.column <= end_line.len() {
        if right_limit.is_some_and(|limit| range.end >= limit) {
            break;
        }
        let c = end_line[range.end.column - 1];
        if !is_boundary(c) {
            break;
        }
        range.end.column += 1;
        text.push(c);
    }

    TextReplacement { range, new_text: text }
}

/// Grows to whole-word boundaries (alphabetic runs).
pub fn grow_to_word_boundary<S: LineSource>(
    replacements: Vec<TextReplacement>,
    source: &S,
) -> Vec<TextReplacement> {
    grow_edits(replacements, source, char::is_alphabetic)
}

/// Grows until the nearest whitespace on either side.
pub fn grow_until_whitespace<S: LineSource>(
    replacements: Vec<TextReplacement>,
    source: &S,
) -> Vec<TextReplacement> {
    grow_edits(replacements, source, |c| !c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextModel;
    use crate::range::TextRange;

    #[test]
    fn test_grow_middle_letter_to_whole_word() {
        let model = TextModel::from_text("hello");
        let replacement = TextReplacement::new(TextRange::at(1, 3, 1, 4), "L");

        let grown = grow_to_word_boundary(vec![replacement], &model);

        assert_eq!(grown.len(), 1);
        assert_eq!(grown[0].range, TextRange::at(1, 1, 1, 6), "covers the whole word");
        assert_eq!(
            grown[0].new_text, "heLlo",
            "original prefix and suffix are preserved verbatim around the edit"
        );
    }

    #[test]
    fn test_grow_stops_at_non_boundary_chars() {
        let model = TextModel::from_text("a foo=bar b");
        let replacement = TextReplacement::new(TextRange::at(1, 4, 1, 5), "O");

        let grown = grow_to_word_boundary(vec![replacement], &model);

        assert_eq!(grown[0].range, TextRange::at(1, 3, 1, 6), "stops at space and '='");
        assert_eq!(grown[0].new_text, "fOo");
    }

    #[test]
    fn test_grow_until_whitespace_crosses_punctuation() {
        let model = TextModel::from_text("x foo.bar y");
        let replacement = TextReplacement::new(TextRange::at(1, 6, 1, 6), "!");

        let grown = grow_until_whitespace(vec![replacement], &model);

        assert_eq!(grown[0].range, TextRange::at(1, 3, 1, 10), "runs to the spaces");
        assert_eq!(grown[0].new_text, "foo!.bar");
    }

    #[test]
    fn test_empty_range_between_whitespace_stays_empty() {
        let model = TextModel::from_text("a  b");
        let replacement = TextReplacement::new(TextRange::at(1, 3, 1, 3), "x");

        let grown = grow_until_whitespace(vec![replacement], &model);

        assert!(grown[0].range.is_empty(), "nothing to grow into on either side");
        assert_eq!(grown[0].new_text, "x");
    }

    #[test]
    fn test_touching_grown_replacements_merge() {
        // Growing both edits inside "abcdef" makes them meet; the
        // result must be one merged replacement, not two.
        let model = TextModel::from_text("abcdef");
        let first = TextReplacement::new(TextRange::at(1, 2, 1, 3), "X");
        let second = TextReplacement::new(TextRange::at(1, 5, 1, 6), "Y");

        let grown = grow_to_word_boundary(vec![first, second], &model);

        assert_eq!(grown.len(), 1, "touching replacements merge");
        assert_eq!(grown[0].range, TextRange::at(1, 1, 1, 7));
        assert_eq!(grown[0].new_text, "aXcdYf");
        assert_eq!(grown[0].apply_to(&model), "aXcdYf");
    }

    #[test]
    fn test_merged_growth_claims_each_character_once() {
        // The first edit would grow rightward across the second one;
        // the merged replacement must still apply cleanly, without
        // repeating the characters between them.
        let model = TextModel::from_text("hello");
        let first = TextReplacement::new(TextRange::at(1, 2, 1, 3), "X");
        let second = TextReplacement::new(TextRange::at(1, 5, 1, 6), "Y");

        let grown = grow_to_word_boundary(vec![first, second], &model);

        assert_eq!(grown.len(), 1);
        assert_eq!(grown[0].range, TextRange::at(1, 1, 1, 6));
        assert_eq!(grown[0].new_text, "hXllY");
        assert_eq!(grown[0].apply_to(&model), "hXllY");
    }

    #[test]
    fn test_whole_words_do_not_merge_across_a_gap() {
        let model = TextModel::from_text("cat, dog");
        let first = TextReplacement::new(TextRange::at(1, 1, 1, 4), "bat");
        let second = TextReplacement::new(TextRange::at(1, 6, 1, 9), "fox");

        let grown = grow_to_word_boundary(vec![first, second], &model);

        // Words are already whole; nothing grows, ranges do not touch.
        assert_eq!(grown.len(), 2);
    }

    #[test]
    fn test_join_replacements_preserves_intervening_text() {
        let model = TextModel::from_text("cat, dog");
        let first = TextReplacement::new(TextRange::at(1, 1, 1, 4), "bat");
        let second = TextReplacement::new(TextRange::at(1, 6, 1, 9), "fox");

        let joined = join_replacements(first, second, &model);

        assert_eq!(joined.range, TextRange::at(1, 1, 1, 9));
        assert_eq!(joined.new_text, "bat, fox", "the ', ' between the ranges survives");
    }

    #[test]
    fn test_growth_only_changes_boundary_characters() {
        // Applying the grown replacement differs from applying the raw
        // one only within the grown word; everything else is intact.
        let model = TextModel::from_text("one two three");
        let raw = TextReplacement::new(TextRange::at(1, 6, 1, 7), "W");

        let grown = grow_to_word_boundary(vec![raw.clone()], &model);
        assert_eq!(grown[0].range, TextRange::at(1, 5, 1, 8));

        assert_eq!(raw.apply_to(&model), "one tWo three");
        assert_eq!(grown[0].apply_to(&model), "one tWo three");
    }

    #[test]
    fn test_unsorted_input_is_sorted_before_growing() {
        let model = TextModel::from_text("aa bb cc");
        let late = TextReplacement::new(TextRange::at(1, 7, 1, 8), "C");
        let early = TextReplacement::new(TextRange::at(1, 1, 1, 2), "A");

        let grown = grow_to_word_boundary(vec![late, early], &model);

        assert_eq!(grown.len(), 2);
        assert!(grown[0].range.start < grown[1].range.start, "output is ordered");
    }
}
