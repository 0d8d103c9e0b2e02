//! Duoview Core - Alignment and presentation engine for two-pane diffs
//!
//! This library computes how the two sides of a diff line up
//! vertically, how a single proposed edit should be rendered, and how
//! scroll positions translate between the panes.

pub mod alignment;
pub mod diff;
pub mod mapping;
pub mod model;
pub mod presentation;
pub mod range;
pub mod replace;
pub mod scroll;

pub use alignment::{compute_alignment, AlignmentOptions};
pub use diff::DiffEngine;
pub use mapping::{Alignment, CharRangeMapping, DiffResult, HeightOverride, LineRangeMapping};
pub use model::{LineSource, TextModel};
pub use presentation::{
    classify, materialize, materialize_or_fallback, ClassifierCache, ClassifyContext,
    CodeShifting, EditMetrics, MonospaceWidths, PresentationError, RenderDescriptor,
    RenderVariantKind, SingleEdit, WidthOracle, MAX_WORD_LENGTH,
};
pub use range::{ColumnRange, LineRange, Position, TextRange};
pub use replace::{
    grow_edits, grow_to_word_boundary, grow_until_whitespace, join_replacements, TextReplacement,
};
pub use scroll::{Pane, ScrollMapping, ScrollPort, ScrollState, ScrollSyncController};
