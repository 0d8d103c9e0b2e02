//! Vertical alignment of the original and modified panes
//!
//! Merges a diff's hunk boundaries with per-pane extra-height events
//! (wrapped lines, decoration zones) into one ordered stream of
//! [`Alignment`]s. The caller must pass mutually consistent snapshots
//! of the diff, the document, and the overrides; mixing a stale diff
//! with fresh overrides is not supported.

use crate::mapping::{Alignment, HeightOverride, LineRangeMapping};
use crate::model::LineSource;
use crate::range::LineRange;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentOptions {
    pub line_height_original: f64,
    pub line_height_modified: f64,
    /// Emit extra synchronization points at character-level change
    /// boundaries inside a hunk.
    pub inner_hunk_alignment: bool,
}

impl AlignmentOptions {
    pub fn uniform(line_height: f64) -> Self {
        Self {
            line_height_original: line_height,
            line_height_modified: line_height,
            inner_hunk_alignment: false,
        }
    }

    pub fn with_inner_hunk_alignment(mut self, enabled: bool) -> Self {
        self.inner_hunk_alignment = enabled;
        self
    }
}

/// Computes the aligned (original-range, modified-range) stream for a
/// diff plus both panes' height overrides.
///
/// Fail-soft: if the diff references lines beyond `original`'s current
/// length (edit applied, diff not yet recomputed), the pass aborts and
/// the alignments accumulated so far are returned.
pub fn compute_alignment(
    diff: &[LineRangeMapping],
    original: &impl LineSource,
    original_overrides: &[HeightOverride],
    modified_overrides: &[HeightOverride],
    opts: &AlignmentOptions,
) -> Vec<Alignment> {
    let mut builder = AlignmentBuilder::new(original_overrides, modified_overrides, *opts);
    for hunk in diff {
        builder.flush_outside_diff(hunk.original.start, hunk.modified.start);
        if builder.align_hunk(hunk, original).is_err() {
            return builder.finish();
        }
    }
    builder.flush_outside_diff(usize::MAX, usize::MAX);
    builder.finish()
}

/// Private sentinel: the diff outran the document.
struct StaleModel;

/// Ascending queue over one pane's overrides. Dequeueing coalesces
/// consecutive entries at the same line (their heights are additive).
struct OverrideQueue<'a> {
    items: &'a [HeightOverride],
    idx: usize,
}

impl<'a> OverrideQueue<'a> {
    fn new(items: &'a [HeightOverride]) -> Self {
        Self { items, idx: 0 }
    }

    fn peek(&self) -> Option<HeightOverride> {
        let first = *self.items.get(self.idx)?;
        let mut total = first.height_px;
        for item in &self.items[self.idx + 1..] {
            if item.line != first.line {
                break;
            }
            total += item.height_px;
        }
        Some(HeightOverride::new(first.line, total))
    }

    fn dequeue(&mut self) -> Option<HeightOverride> {
        let coalesced = self.peek()?;
        while self
            .items
            .get(self.idx)
            .is_some_and(|item| item.line == coalesced.line)
        {
            self.idx += 1;
        }
        Some(coalesced)
    }

    /// Consumes every override below `until` and sums their heights.
    fn sum_below(&mut self, until: usize) -> f64 {
        let mut total = 0.0;
        while let Some(next) = self.peek() {
            if next.line >= until {
                break;
            }
            total += next.height_px;
            self.dequeue();
        }
        total
    }
}

/// Accumulator for one alignment pass: output list, the two pane
/// cursors, and the two override queues.
struct AlignmentBuilder<'a> {
    result: Vec<Alignment>,
    last_original: usize,
    last_modified: usize,
    original_overrides: OverrideQueue<'a>,
    modified_overrides: OverrideQueue<'a>,
    opts: AlignmentOptions,
}

/// Per-hunk emission cursors, separate from the pass-level ones so a
/// hunk can emit several internal synchronization points.
struct HunkCursor {
    first: bool,
    last_original: usize,
    last_modified: usize,
}

impl<'a> AlignmentBuilder<'a> {
    fn new(
        original_overrides: &'a [HeightOverride],
        modified_overrides: &'a [HeightOverride],
        opts: AlignmentOptions,
    ) -> Self {
        Self {
            result: Vec::new(),
            last_original: 1,
            last_modified: 1,
            original_overrides: OverrideQueue::new(original_overrides),
            modified_overrides: OverrideQueue::new(modified_overrides),
            opts,
        }
    }

    /// Merge-join over the two override queues for the region before
    /// the next hunk. Keyed by distance *relative* to the cursors:
    /// absolute line numbers diverge as hunks accumulate skew.
    fn flush_outside_diff(&mut self, until_original: usize, until_modified: usize) {
        loop {
            let original_next = self
                .original_overrides
                .peek()
                .filter(|o| o.line < until_original);
            let modified_next = self
                .modified_overrides
                .peek()
                .filter(|o| o.line < until_modified);

            let (original_at, modified_at) = match (original_next, modified_next) {
                (None, None) => break,
                (Some(o), None) => {
                    self.original_overrides.dequeue();
                    (o, self.synthesize_modified(o.line))
                }
                (None, Some(m)) => {
                    self.modified_overrides.dequeue();
                    (self.synthesize_original(m.line), m)
                }
                (Some(o), Some(m)) => {
                    let original_distance = o.line - self.last_original;
                    let modified_distance = m.line - self.last_modified;
                    if original_distance < modified_distance {
                        self.original_overrides.dequeue();
                        (o, self.synthesize_modified(o.line))
                    } else if original_distance > modified_distance {
                        self.modified_overrides.dequeue();
                        (self.synthesize_original(m.line), m)
                    } else {
                        // Same relative position: merge into one unit.
                        self.original_overrides.dequeue();
                        self.modified_overrides.dequeue();
                        (o, m)
                    }
                }
            };

            self.result.push(Alignment {
                original_range: LineRange::of_length(original_at.line, 1),
                modified_range: LineRange::of_length(modified_at.line, 1),
                original_height_px: self.opts.line_height_original + original_at.height_px,
                modified_height_px: self.opts.line_height_modified + modified_at.height_px,
                diff: None,
            });
        }
    }

    fn synthesize_modified(&self, original_line: usize) -> HeightOverride {
        HeightOverride::new(original_line - self.last_original + self.last_modified, 0.0)
    }

    fn synthesize_original(&self, modified_line: usize) -> HeightOverride {
        HeightOverride::new(modified_line - self.last_modified + self.last_original, 0.0)
    }

    fn align_hunk(
        &mut self,
        hunk: &LineRangeMapping,
        original: &impl LineSource,
    ) -> Result<(), StaleModel> {
        let mut cursor = HunkCursor {
            first: true,
            last_original: hunk.original.start,
            last_modified: hunk.modified.start,
        };

        if self.opts.inner_hunk_alignment {
            if let Some(inner) = &hunk.inner_changes {
                for change in inner {
                    if change.original.start.column > 1 && change.modified.start.column > 1 {
                        // Unmodified text precedes the change on this line.
                        self.emit(
                            &mut cursor,
                            hunk,
                            change.original.start.line,
                            change.modified.start.line,
                            false,
                        );
                    }
                    if change.original.end.line > original.line_count() {
                        return Err(StaleModel);
                    }
                    let max_column = original.line_max_column(change.original.end.line);
                    if change.original.end.column < max_column {
                        // Unmodified text follows the change.
                        self.emit(
                            &mut cursor,
                            hunk,
                            change.original.end.line,
                            change.modified.end.line,
                            false,
                        );
                    }
                }
            }
        }

        // Every hunk ends with a synchronization point, even if one
        // side is zero-length.
        self.emit(
            &mut cursor,
            hunk,
            hunk.original.end_exclusive,
            hunk.modified.end_exclusive,
            true,
        );

        self.last_original = hunk.original.end_exclusive;
        self.last_modified = hunk.modified.end_exclusive;
        Ok(())
    }

    fn emit(
        &mut self,
        cursor: &mut HunkCursor,
        hunk: &LineRangeMapping,
        original_until: usize,
        modified_until: usize,
        force: bool,
    ) {
        if original_until < cursor.last_original || modified_until < cursor.last_modified {
            return;
        }
        if cursor.first {
            cursor.first = false;
        } else if !force
            && (original_until == cursor.last_original || modified_until == cursor.last_modified)
        {
            return;
        }

        let original_range = LineRange::new(cursor.last_original, original_until);
        let modified_range = LineRange::new(cursor.last_modified, modified_until);
        if original_range.is_empty() && modified_range.is_empty() {
            return;
        }

        let original_height_px = original_range.len() as f64 * self.opts.line_height_original
            + self.original_overrides.sum_below(original_until);
        let modified_height_px = modified_range.len() as f64 * self.opts.line_height_modified
            + self.modified_overrides.sum_below(modified_until);

        self.result.push(Alignment {
            original_range,
            modified_range,
            original_height_px,
            modified_height_px,
            diff: Some(hunk.clone()),
        });
        cursor.last_original = original_until;
        cursor.last_modified = modified_until;
    }

    fn finish(self) -> Vec<Alignment> {
        self.result
    }
}
