//! Render-variant classification for a single proposed edit
//!
//! Given one edit (line ranges plus character-level inner changes)
//! and the surrounding context, picks the rendering that represents
//! it best and produces the exact decomposition that rendering needs.
//! The decision list is ordered: earlier rules have priority, they do
//! not merely filter.

use crate::mapping::CharRangeMapping;
use crate::model::LineSource;
use crate::range::{LineRange, Position, TextRange};
use crate::replace::{grow_to_word_boundary, grow_until_whitespace, TextReplacement};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use unicode_width::UnicodeWidthStr;

/// Spans longer than this never qualify as word replacements.
pub const MAX_WORD_LENGTH: usize = 100;

/// Fixed padding between the two boxes of a side-by-side rendering.
pub const SIDE_BY_SIDE_PADDING_PX: f64 = 20.0;

/// One proposed edit overlaid on a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleEdit {
    pub original_range: LineRange,
    pub modified_range: LineRange,
    /// Ordered character-level sub-edits.
    pub inner_changes: Vec<CharRangeMapping>,
    /// Where the user originally typed, if known.
    pub cursor: Option<Position>,
    /// Explicit display location annotation; forces the custom variant.
    pub display_location: Option<TextRange>,
    /// The user collapsed the overlay.
    pub collapsed: bool,
}

impl SingleEdit {
    pub fn new(
        original_range: LineRange,
        modified_range: LineRange,
        inner_changes: Vec<CharRangeMapping>,
    ) -> Self {
        Self {
            original_range,
            modified_range,
            inner_changes,
            cursor: None,
            display_location: None,
            collapsed: false,
        }
    }

    pub fn with_cursor(mut self, cursor: Position) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn with_display_location(mut self, location: TextRange) -> Self {
        self.display_location = Some(location);
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }
}

/// How much the host allows inserted text to push existing code around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeShifting {
    Never,
    SubtleIndicator,
    Always,
}

/// Pixel width of the widest line in a line range. Implemented by the
/// host editor; [`MonospaceWidths`] is the library-provided one.
pub trait WidthOracle {
    fn max_line_width(&self, range: &LineRange) -> f64;
}

/// Width oracle for monospace rendering: display cells
/// (unicode-width) times a fixed character width.
pub struct MonospaceWidths<'a, S: LineSource> {
    source: &'a S,
    char_width_px: f64,
}

impl<'a, S: LineSource> MonospaceWidths<'a, S> {
    pub fn new(source: &'a S, char_width_px: f64) -> Self {
        Self {
            source,
            char_width_px,
        }
    }
}

impl<S: LineSource> WidthOracle for MonospaceWidths<'_, S> {
    fn max_line_width(&self, range: &LineRange) -> f64 {
        range
            .lines()
            .map(|line| self.source.line_content(line).width())
            .max()
            .unwrap_or(0) as f64
            * self.char_width_px
    }
}

/// Contextual signals the classifier decides on.
pub struct ClassifyContext<'a> {
    pub in_diff_editor: bool,
    pub allow_code_shifting: CodeShifting,
    pub render_side_by_side: bool,
    pub editor_width_px: f64,
    pub minimap_width_px: f64,
    pub vertical_scrollbar_width_px: f64,
    pub original_widths: &'a dyn WidthOracle,
    pub modified_widths: &'a dyn WidthOracle,
}

/// The closed set of renderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderVariantKind {
    WordReplacements,
    LineReplacement,
    SideBySide,
    Deletion,
    InsertionInline,
    InsertionMultiLine,
    Collapsed,
    Custom,
}

impl RenderVariantKind {
    /// Variants whose fit depends on the editor width and must be
    /// re-decided on resize.
    pub fn is_width_sensitive(&self) -> bool {
        matches!(
            self,
            RenderVariantKind::SideBySide | RenderVariantKind::LineReplacement
        )
    }
}

/// Picks the render variant for `edit`. Pure: same inputs, same answer.
pub fn classify(
    edit: &SingleEdit,
    original: &impl LineSource,
    modified: &impl LineSource,
    ctx: &ClassifyContext,
) -> RenderVariantKind {
    if edit.display_location.is_some() {
        return RenderVariantKind::Custom;
    }
    if edit.collapsed {
        return RenderVariantKind::Collapsed;
    }

    if !ctx.in_diff_editor {
        if is_single_line_insertion(edit) && ctx.allow_code_shifting != CodeShifting::Never {
            if is_insertion_at_or_after_cursor(edit) {
                return RenderVariantKind::InsertionInline;
            }
            // Inserting before the cursor would move it.
            return RenderVariantKind::LineReplacement;
        }
        if is_pure_deletion(edit, original, modified) {
            return RenderVariantKind::Deletion;
        }
        if is_single_multi_line_insertion(edit) && ctx.allow_code_shifting == CodeShifting::Always {
            return RenderVariantKind::InsertionMultiLine;
        }
        if word_replacements_apply(edit, original, modified) {
            return RenderVariantKind::WordReplacements;
        }
    }

    let original_lines = edit.original_range.len();
    let modified_lines = edit.modified_range.len();
    if original_lines > 0 && modified_lines > 0 {
        if original_lines == 1 && modified_lines == 1 && !ctx.in_diff_editor {
            return RenderVariantKind::LineReplacement;
        }
        if ctx.render_side_by_side && fits_viewport(edit, ctx) {
            return RenderVariantKind::SideBySide;
        }
        return RenderVariantKind::LineReplacement;
    }

    if ctx.in_diff_editor {
        // Pure insert/delete inside a diff editor.
        if is_pure_deletion(edit, original, modified) {
            return RenderVariantKind::Deletion;
        }
        if is_single_multi_line_insertion(edit) && ctx.allow_code_shifting == CodeShifting::Always {
            return RenderVariantKind::InsertionMultiLine;
        }
    }

    RenderVariantKind::SideBySide
}

fn is_single_line_insertion(edit: &SingleEdit) -> bool {
    !edit.inner_changes.is_empty()
        && edit
            .inner_changes
            .iter()
            .all(|c| c.original.is_empty() && c.modified.is_single_line())
}

/// The typed cursor sits before or on every insertion point, so
/// shifting the text never moves it.
fn is_insertion_at_or_after_cursor(edit: &SingleEdit) -> bool {
    match edit.cursor {
        Some(cursor) => edit
            .inner_changes
            .iter()
            .all(|c| cursor.is_before_or_equal(&c.original.start)),
        // An unknown cursor may sit after the insertion point.
        None => false,
    }
}

fn is_pure_deletion(
    edit: &SingleEdit,
    original: &impl LineSource,
    modified: &impl LineSource,
) -> bool {
    !edit.inner_changes.is_empty()
        && edit.inner_changes.iter().all(|c| {
            let new_text = modified.value_of_range(&c.modified);
            let old_text = original.value_of_range(&c.original);
            new_text.trim().is_empty()
                && !old_text.is_empty()
                && (old_text.len() > new_text.len() || !old_text.trim().is_empty())
        })
}

fn is_single_multi_line_insertion(edit: &SingleEdit) -> bool {
    edit.inner_changes.len() == 1 && {
        let change = &edit.inner_changes[0];
        change.original.is_empty() && !change.modified.is_single_line()
    }
}

fn word_replacements_apply(
    edit: &SingleEdit,
    original: &impl LineSource,
    modified: &impl LineSource,
) -> bool {
    if edit.inner_changes.len() != 1 {
        return false;
    }
    if edit.original_range.len() != 1 || edit.modified_range.len() != 1 {
        return false;
    }
    let short_enough = edit.inner_changes.iter().all(|c| {
        c.original.length_in_columns() < MAX_WORD_LENGTH
            && c.modified.length_in_columns() < MAX_WORD_LENGTH
    });
    if !short_enough {
        return false;
    }

    let replacements = to_replacements(edit, modified);
    if replacements.iter().all(|r| !r.range.is_empty()) {
        return true;
    }
    // A pure insertion disguised as a short word edit is acceptable
    // only if whitespace growth turns it into a real span.
    grow_until_whitespace(replacements, original)
        .iter()
        .all(|r| !r.range.is_empty() && r.range.length_in_columns() < MAX_WORD_LENGTH)
}

fn to_replacements(edit: &SingleEdit, modified: &impl LineSource) -> Vec<TextReplacement> {
    edit.inner_changes
        .iter()
        .map(|c| TextReplacement::new(c.original, modified.value_of_range(&c.modified)))
        .collect()
}

fn fits_viewport(edit: &SingleEdit, ctx: &ClassifyContext) -> bool {
    let available =
        ctx.editor_width_px - ctx.minimap_width_px - ctx.vertical_scrollbar_width_px;
    let required = ctx.original_widths.max_line_width(&edit.original_range)
        + ctx.modified_widths.max_line_width(&edit.modified_range)
        + SIDE_BY_SIDE_PADDING_PX;
    required <= available
}

// ==================== Caching ====================

/// Structural identity of an edit; caching key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EditKey {
    original_range: LineRange,
    modified_range: LineRange,
    inner_changes: Vec<CharRangeMapping>,
}

impl EditKey {
    fn of(edit: &SingleEdit) -> Self {
        Self {
            original_range: edit.original_range,
            modified_range: edit.modified_range,
            inner_changes: edit.inner_changes.clone(),
        }
    }
}

struct CachedChoice {
    kind: RenderVariantKind,
    editor_width_px: f64,
    decided_at: Instant,
}

/// Memoizes classification per edit identity. Width-sensitive
/// variants are re-decided when the editor width changes; everything
/// else sticks until the edit itself changes.
#[derive(Default)]
pub struct ClassifierCache {
    entries: FxHashMap<EditKey, CachedChoice>,
}

impl ClassifierCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(
        &mut self,
        edit: &SingleEdit,
        original: &impl LineSource,
        modified: &impl LineSource,
        ctx: &ClassifyContext,
    ) -> RenderVariantKind {
        let key = EditKey::of(edit);
        if let Some(previous) = self.entries.get(&key) {
            if !previous.kind.is_width_sensitive()
                || previous.editor_width_px == ctx.editor_width_px
            {
                return previous.kind;
            }
        }
        let kind = classify(edit, original, modified, ctx);
        self.entries.insert(
            key,
            CachedChoice {
                kind,
                editor_width_px: ctx.editor_width_px,
                decided_at: Instant::now(),
            },
        );
        kind
    }

    /// Drops entries older than `age`; edits that stopped being shown
    /// never get an identity-miss to evict them.
    pub fn prune_older_than(&mut self, age: Duration) {
        self.entries.retain(|_, c| c.decided_at.elapsed() <= age);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ==================== Materialization ====================

/// Telemetry-only numbers carried by pass-through variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditMetrics {
    pub original_line_count: usize,
    pub modified_line_count: usize,
    pub inner_change_count: usize,
    /// Lines between the typed cursor and the edit, if a cursor is known.
    pub cursor_line_distance: Option<usize>,
}

impl EditMetrics {
    fn of(edit: &SingleEdit) -> Self {
        let cursor_line_distance = edit.cursor.map(|cursor| {
            let range = &edit.original_range;
            if range.contains(cursor.line) {
                0
            } else if cursor.line < range.start {
                range.start - cursor.line
            } else {
                cursor.line + 1 - range.end_exclusive
            }
        });
        Self {
            original_line_count: edit.original_range.len(),
            modified_line_count: edit.modified_range.len(),
            inner_change_count: edit.inner_changes.len(),
            cursor_line_distance,
        }
    }
}

/// Variant-specific geometry and text for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderDescriptor {
    WordReplacements {
        replacements: Vec<TextReplacement>,
    },
    LineReplacement {
        original_range: LineRange,
        modified_range: LineRange,
        modified_lines: Vec<String>,
        changes: Vec<CharRangeMapping>,
    },
    SideBySide {
        metrics: EditMetrics,
    },
    Deletion {
        original_range: LineRange,
        deletions: Vec<TextRange>,
    },
    InsertionInline {
        metrics: EditMetrics,
    },
    InsertionMultiLine {
        line: usize,
        column: usize,
        text: String,
    },
    Collapsed {
        metrics: EditMetrics,
    },
    Custom {
        display_location: TextRange,
        metrics: EditMetrics,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PresentationError {
    #[error("custom render variant requires a display location")]
    MissingDisplayLocation,
    #[error("multi-line insertion requires exactly one pure-insertion inner change, found {found}")]
    MalformedInsertion { found: usize },
}

/// Produces the decomposition the chosen variant needs.
pub fn materialize(
    kind: RenderVariantKind,
    edit: &SingleEdit,
    original: &impl LineSource,
    modified: &impl LineSource,
) -> Result<RenderDescriptor, PresentationError> {
    match kind {
        RenderVariantKind::Deletion => Ok(RenderDescriptor::Deletion {
            original_range: edit.original_range,
            deletions: edit.inner_changes.iter().map(|c| c.original).collect(),
        }),
        RenderVariantKind::InsertionMultiLine => {
            let sole = match edit.inner_changes.as_slice() {
                [only] if only.original.is_empty() => only,
                other => {
                    return Err(PresentationError::MalformedInsertion { found: other.len() })
                }
            };
            Ok(RenderDescriptor::InsertionMultiLine {
                line: sole.original.start.line,
                column: sole.original.start.column,
                text: modified.value_of_range(&sole.modified),
            })
        }
        RenderVariantKind::WordReplacements => {
            let replacements = to_replacements(edit, modified);
            let grown = grow_to_word_boundary(replacements.clone(), original);
            let grown = if grown.iter().any(|r| r.range.is_empty()) {
                // Word growth added nothing (edit sits between
                // non-alphabetic characters): retry until whitespace.
                grow_until_whitespace(replacements, original)
            } else {
                grown
            };
            Ok(RenderDescriptor::WordReplacements { replacements: grown })
        }
        RenderVariantKind::LineReplacement => Ok(line_replacement_descriptor(edit, modified)),
        RenderVariantKind::SideBySide => Ok(RenderDescriptor::SideBySide {
            metrics: EditMetrics::of(edit),
        }),
        RenderVariantKind::InsertionInline => Ok(RenderDescriptor::InsertionInline {
            metrics: EditMetrics::of(edit),
        }),
        RenderVariantKind::Collapsed => Ok(RenderDescriptor::Collapsed {
            metrics: EditMetrics::of(edit),
        }),
        RenderVariantKind::Custom => match edit.display_location {
            Some(display_location) => Ok(RenderDescriptor::Custom {
                display_location,
                metrics: EditMetrics::of(edit),
            }),
            None => Err(PresentationError::MissingDisplayLocation),
        },
    }
}

/// Like [`materialize`], but never fails a rendering pass: an
/// invariant violation asserts in debug builds and degrades to the
/// line-replacement rendering in release.
pub fn materialize_or_fallback(
    kind: RenderVariantKind,
    edit: &SingleEdit,
    original: &impl LineSource,
    modified: &impl LineSource,
) -> RenderDescriptor {
    match materialize(kind, edit, original, modified) {
        Ok(descriptor) => descriptor,
        Err(error) => {
            debug_assert!(false, "presentation invariant violated: {error}");
            line_replacement_descriptor(edit, modified)
        }
    }
}

fn line_replacement_descriptor(
    edit: &SingleEdit,
    modified: &impl LineSource,
) -> RenderDescriptor {
    RenderDescriptor::LineReplacement {
        original_range: edit.original_range,
        modified_range: edit.modified_range,
        modified_lines: edit
            .modified_range
            .lines()
            .map(|line| modified.line_content(line).to_string())
            .collect(),
        changes: edit.inner_changes.clone(),
    }
}
