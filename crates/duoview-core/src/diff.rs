//! Diff computation producing the shared hunk data model

use crate::mapping::{CharRangeMapping, DiffResult, LineRangeMapping};
use crate::range::{LineRange, Position, TextRange};
use imara_diff::{Algorithm, Diff, InternedInput, TokenSource};
use std::ops::Range;

/// Computes line-level hunks (and optional character-level inner
/// changes) between two text buffers.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    inner_changes: bool,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffEngine {
    pub fn new() -> Self {
        Self {
            inner_changes: true,
        }
    }

    /// Disable to get legacy line-only hunks (`inner_changes: None`).
    pub fn with_inner_changes(mut self, enabled: bool) -> Self {
        self.inner_changes = enabled;
        self
    }

    pub fn diff_strings(&self, old: &str, new: &str) -> DiffResult {
        let input = InternedInput::new(old, new);
        let diff = Diff::compute(Algorithm::Histogram, &input);

        let old_lines: Vec<&str> = old.split('\n').collect();
        let new_lines: Vec<&str> = new.split('\n').collect();

        let mut mappings = Vec::new();
        let mut insertions = 0;
        let mut deletions = 0;

        for hunk in diff.hunks() {
            let original =
                LineRange::new(hunk.before.start as usize + 1, hunk.before.end as usize + 1);
            let modified =
                LineRange::new(hunk.after.start as usize + 1, hunk.after.end as usize + 1);
            deletions += original.len();
            insertions += modified.len();

            let inner = if self.inner_changes {
                Some(inner_char_changes(
                    &original,
                    &modified,
                    &old_lines,
                    &new_lines,
                ))
            } else {
                None
            };
            mappings.push(LineRangeMapping::new(original, modified, inner));
        }

        DiffResult {
            mappings,
            insertions,
            deletions,
        }
    }
}

/// Char tokens for the inner (within-hunk) diff pass.
struct CharTokens<'a>(&'a str);

impl<'a> TokenSource for CharTokens<'a> {
    type Token = char;
    type Tokenizer = std::str::Chars<'a>;

    fn tokenize(&self) -> Self::Tokenizer {
        self.0.chars()
    }

    fn estimate_tokens(&self) -> u32 {
        self.0.len() as u32
    }
}

/// Maps char offsets within a hunk's joined text back to 1-based
/// document positions. Index `char_count` is one past the end.
struct OffsetToPosition {
    positions: Vec<Position>,
}

impl OffsetToPosition {
    fn build(text: &str, start_line: usize) -> Self {
        let mut positions = Vec::with_capacity(text.len() + 1);
        let mut line = start_line;
        let mut column = 1;
        for c in text.chars() {
            positions.push(Position::new(line, column));
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        positions.push(Position::new(line, column));
        Self { positions }
    }

    fn range(&self, chars: &Range<u32>) -> TextRange {
        TextRange::new(
            self.positions[chars.start as usize],
            self.positions[chars.end as usize],
        )
    }
}

fn inner_char_changes(
    original: &LineRange,
    modified: &LineRange,
    old_lines: &[&str],
    new_lines: &[&str],
) -> Vec<CharRangeMapping> {
    let old_text = join_lines(old_lines, original);
    let new_text = join_lines(new_lines, modified);

    let input = InternedInput::new(CharTokens(&old_text), CharTokens(&new_text));
    let diff = Diff::compute(Algorithm::Histogram, &input);

    let old_positions = OffsetToPosition::build(&old_text, original.start);
    let new_positions = OffsetToPosition::build(&new_text, modified.start);

    diff.hunks()
        .map(|hunk| {
            CharRangeMapping::new(
                old_positions.range(&hunk.before),
                new_positions.range(&hunk.after),
            )
        })
        .collect()
}

fn join_lines(lines: &[&str], range: &LineRange) -> String {
    range
        .lines()
        .filter_map(|line| lines.get(line - 1).copied())
        .collect::<Vec<_>>()
        .join("\n")
}
