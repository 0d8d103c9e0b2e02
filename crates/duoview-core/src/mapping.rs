//! The shared diff data model: hunks, inner changes, alignments

use crate::range::{LineRange, TextRange};
use serde::{Deserialize, Serialize};

/// A character-level sub-edit within a hunk. Either side may be empty
/// (pure insertion or deletion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharRangeMapping {
    pub original: TextRange,
    pub modified: TextRange,
}

impl CharRangeMapping {
    pub fn new(original: TextRange, modified: TextRange) -> Self {
        Self { original, modified }
    }
}

/// One diff hunk: a pair of line ranges plus optional character-level
/// inner changes. `inner_changes` is `None` only in legacy
/// line-only mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRangeMapping {
    pub original: LineRange,
    pub modified: LineRange,
    pub inner_changes: Option<Vec<CharRangeMapping>>,
}

impl LineRangeMapping {
    pub fn new(
        original: LineRange,
        modified: LineRange,
        inner_changes: Option<Vec<CharRangeMapping>>,
    ) -> Self {
        Self {
            original,
            modified,
            inner_changes,
        }
    }
}

/// An ordered, non-overlapping sequence of hunks plus line stats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub mappings: Vec<LineRangeMapping>,
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// An out-of-band vertical-space event at a line: wrapped-line
/// overflow or a decoration view zone. Ordered ascending by `line`;
/// multiple overrides at the same position are additive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightOverride {
    pub line: usize,
    pub height_px: f64,
}

impl HeightOverride {
    pub fn new(line: usize, height_px: f64) -> Self {
        Self { line, height_px }
    }
}

/// A contiguous span of lines in both panes rendered at the same
/// vertical position. `diff` is `None` outside any hunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub original_range: LineRange,
    pub modified_range: LineRange,
    pub original_height_px: f64,
    pub modified_height_px: f64,
    pub diff: Option<LineRangeMapping>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_result_serde_round_trip() {
        let diff = DiffResult {
            mappings: vec![LineRangeMapping::new(
                LineRange::new(10, 12),
                LineRange::new(10, 11),
                Some(vec![CharRangeMapping::new(
                    TextRange::at(10, 3, 11, 2),
                    TextRange::at(10, 3, 10, 4),
                )]),
            )],
            insertions: 1,
            deletions: 2,
        };
        let json = serde_json::to_string(&diff).expect("serialize");
        let back: DiffResult = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, diff);
    }

    #[test]
    fn test_alignment_serde_round_trip() {
        let alignment = Alignment {
            original_range: LineRange::new(5, 6),
            modified_range: LineRange::new(5, 6),
            original_height_px: 38.0,
            modified_height_px: 18.0,
            diff: None,
        };
        let json = serde_json::to_string(&alignment).expect("serialize");
        let back: Alignment = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, alignment);
    }
}
