//! Scroll synchronization between the two panes
//!
//! Alignments pin vertical positions in one pane to positions in the
//! other; between pins the mapping interpolates linearly, outside the
//! last pin it extrapolates 1:1. A controller applies the mapping on
//! every scroll event and eases top padding changes so the modified
//! pane never jumps.

use crate::mapping::Alignment;

/// One segment of the piecewise-linear pixel mapping: a span of
/// original-pane pixels paired with the modified-pane span it
/// stretches over. Either span may be zero height.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    original_top: f64,
    original_height: f64,
    modified_top: f64,
    modified_height: f64,
}

/// A monotone mapping between vertical pixel offsets of the two
/// panes, built from an alignment sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollMapping {
    segments: Vec<Segment>,
}

impl ScrollMapping {
    /// Builds the mapping by stacking alignment heights top to
    /// bottom. Expects the alignments ordered as
    /// [`compute_alignment`](crate::alignment::compute_alignment)
    /// produces them.
    pub fn from_alignments(alignments: &[Alignment]) -> Self {
        let mut segments = Vec::with_capacity(alignments.len());
        let mut original_top = 0.0;
        let mut modified_top = 0.0;
        for alignment in alignments {
            segments.push(Segment {
                original_top,
                original_height: alignment.original_height_px,
                modified_top,
                modified_height: alignment.modified_height_px,
            });
            original_top += alignment.original_height_px;
            modified_top += alignment.modified_height_px;
        }
        Self { segments }
    }

    /// Maps an original-pane scroll offset to the modified pane.
    pub fn map_to_modified(&self, original_px: f64) -> f64 {
        Self::map(
            original_px,
            self.segments.iter().map(|s| {
                (
                    s.original_top,
                    s.original_height,
                    s.modified_top,
                    s.modified_height,
                )
            }),
        )
    }

    /// Maps a modified-pane scroll offset back to the original pane.
    pub fn map_to_original(&self, modified_px: f64) -> f64 {
        Self::map(
            modified_px,
            self.segments.iter().map(|s| {
                (
                    s.modified_top,
                    s.modified_height,
                    s.original_top,
                    s.original_height,
                )
            }),
        )
    }

    fn map(px: f64, segments: impl Iterator<Item = (f64, f64, f64, f64)>) -> f64 {
        let mut last: Option<(f64, f64, f64, f64)> = None;
        for (from_top, from_height, to_top, to_height) in segments {
            if px < from_top {
                break;
            }
            if px < from_top + from_height {
                // A zero-height target span collapses the whole
                // source span onto its top.
                let fraction = (px - from_top) / from_height;
                return to_top + fraction * to_height;
            }
            last = Some((from_top, from_height, to_top, to_height));
        }
        match last {
            // Past the last pin: extrapolate 1:1.
            Some((from_top, from_height, to_top, to_height)) => {
                px - (from_top + from_height) + to_top + to_height
            }
            None => px,
        }
    }
}

/// Cubic ease-out over a normalized `t` in `[0, 1]`.
fn ease_out_cubic(t: f64) -> f64 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// An in-flight animated change of the modified pane's top padding.
#[derive(Debug, Clone, Copy, PartialEq)]
struct EasedTransition {
    from_px: f64,
    to_px: f64,
    start_time: f64,
    duration: f64,
}

impl EasedTransition {
    fn value_at(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return self.to_px;
        }
        let t = (now - self.start_time) / self.duration;
        self.from_px + (self.to_px - self.from_px) * ease_out_cubic(t)
    }

    fn is_done(&self, now: f64) -> bool {
        now - self.start_time >= self.duration
    }
}

/// Which pane the user is actively scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Original,
    Modified,
}

/// The vertical and horizontal scroll state of one pane, as the host
/// editor exposes it.
pub trait ScrollPort {
    fn scroll_top(&self) -> f64;
    fn set_scroll_top(&mut self, px: f64);
    fn scroll_left(&self) -> f64;
    fn set_scroll_left(&mut self, px: f64);
}

/// Keeps the two panes' scroll positions consistent through the
/// alignment mapping. Time is passed in explicitly (seconds) so hosts
/// drive the easing off their own frame clock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollSyncController {
    mapping: ScrollMapping,
    top_padding_px: f64,
    transition: Option<EasedTransition>,
}

/// Duration of the top-padding ease, in seconds.
const PADDING_EASE_SECONDS: f64 = 0.5;

impl ScrollSyncController {
    pub fn new(mapping: ScrollMapping) -> Self {
        Self {
            mapping,
            top_padding_px: 0.0,
            transition: None,
        }
    }

    /// Replaces the mapping after a re-alignment; scroll positions
    /// are reconciled on the next sync.
    pub fn set_mapping(&mut self, mapping: ScrollMapping) {
        self.mapping = mapping;
    }

    pub fn mapping(&self) -> &ScrollMapping {
        &self.mapping
    }

    /// Starts easing the modified pane's top padding towards
    /// `target_px`. A target equal to the current value cancels any
    /// in-flight transition.
    pub fn set_modified_top_padding(&mut self, target_px: f64, now: f64) {
        let current = self.top_padding_at(now);
        if (target_px - current).abs() < f64::EPSILON {
            self.top_padding_px = target_px;
            self.transition = None;
            return;
        }
        self.transition = Some(EasedTransition {
            from_px: current,
            to_px: target_px,
            start_time: now,
            duration: PADDING_EASE_SECONDS,
        });
        self.top_padding_px = target_px;
    }

    /// The padding value to render at `now`. Settles exactly on the
    /// target once the transition has run its duration.
    pub fn top_padding_at(&self, now: f64) -> f64 {
        match &self.transition {
            Some(transition) if !transition.is_done(now) => transition.value_at(now),
            _ => self.top_padding_px,
        }
    }

    /// True while a padding transition still needs frames.
    pub fn is_animating(&self, now: f64) -> bool {
        matches!(&self.transition, Some(t) if !t.is_done(now))
    }

    /// The user scrolled the original pane; moves the modified pane
    /// to the mapped position and mirrors horizontal scroll.
    pub fn follow_original(
        &self,
        original: &impl ScrollPort,
        modified: &mut impl ScrollPort,
    ) {
        modified.set_scroll_top(self.mapping.map_to_modified(original.scroll_top()));
        modified.set_scroll_left(original.scroll_left());
    }

    /// The user scrolled the modified pane; the inverse of
    /// [`follow_original`](Self::follow_original).
    pub fn follow_modified(
        &self,
        modified: &impl ScrollPort,
        original: &mut impl ScrollPort,
    ) {
        original.set_scroll_top(self.mapping.map_to_original(modified.scroll_top()));
        original.set_scroll_left(modified.scroll_left());
    }

    /// Dispatches on which pane the user drives.
    pub fn sync(
        &self,
        driver: Pane,
        original: &mut impl ScrollPort,
        modified: &mut impl ScrollPort,
    ) {
        match driver {
            Pane::Original => self.follow_original(&original.clone_state(), modified),
            Pane::Modified => self.follow_modified(&modified.clone_state(), original),
        }
    }
}

/// Snapshot helper so [`ScrollSyncController::sync`] can read one
/// pane while writing the other.
pub trait ScrollPortExt: ScrollPort {
    fn clone_state(&self) -> ScrollState {
        ScrollState {
            top: self.scroll_top(),
            left: self.scroll_left(),
        }
    }
}

impl<T: ScrollPort + ?Sized> ScrollPortExt for T {}

/// A plain-value [`ScrollPort`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollState {
    pub top: f64,
    pub left: f64,
}

impl ScrollPort for ScrollState {
    fn scroll_top(&self) -> f64 {
        self.top
    }

    fn set_scroll_top(&mut self, px: f64) {
        self.top = px;
    }

    fn scroll_left(&self) -> f64 {
        self.left
    }

    fn set_scroll_left(&mut self, px: f64) {
        self.left = px;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Alignment;
    use crate::range::LineRange;

    fn alignment(original_h: f64, modified_h: f64) -> Alignment {
        Alignment {
            original_range: LineRange::new(1, 2),
            modified_range: LineRange::new(1, 2),
            original_height_px: original_h,
            modified_height_px: modified_h,
            diff: None,
        }
    }

    #[test]
    fn test_identity_mapping_without_alignments() {
        let mapping = ScrollMapping::from_alignments(&[]);
        assert_eq!(mapping.map_to_modified(123.0), 123.0);
        assert_eq!(mapping.map_to_original(45.5), 45.5);
    }

    #[test]
    fn test_equal_heights_map_one_to_one() {
        let mapping = ScrollMapping::from_alignments(&[alignment(100.0, 100.0)]);
        assert_eq!(mapping.map_to_modified(40.0), 40.0);
        assert_eq!(mapping.map_to_original(40.0), 40.0);
    }

    #[test]
    fn test_hunk_skew_shifts_later_offsets() {
        // 100px of common prefix, then a hunk occupying 40px in the
        // original and 20px in the modified pane.
        let mapping =
            ScrollMapping::from_alignments(&[alignment(100.0, 100.0), alignment(40.0, 20.0)]);

        assert_eq!(mapping.map_to_modified(50.0), 50.0, "inside the common prefix");
        assert_eq!(mapping.map_to_modified(120.0), 110.0, "halfway through the hunk");
        assert_eq!(
            mapping.map_to_modified(200.0),
            180.0,
            "past the hunk the offset shrinks by the height delta"
        );
        assert_eq!(mapping.map_to_original(180.0), 200.0, "inverse agrees");
    }

    #[test]
    fn test_zero_height_span_snaps() {
        // A pure insertion: 0px on the original side, 36px modified.
        let mapping =
            ScrollMapping::from_alignments(&[alignment(50.0, 50.0), alignment(0.0, 36.0)]);

        assert_eq!(
            mapping.map_to_original(60.0),
            50.0,
            "anywhere inside the inserted block maps to the insertion point"
        );
        assert_eq!(mapping.map_to_modified(70.0), 106.0, "past the pin, 1:1 again");
    }

    #[test]
    fn test_mapping_is_monotone() {
        let mapping = ScrollMapping::from_alignments(&[
            alignment(60.0, 60.0),
            alignment(0.0, 40.0),
            alignment(80.0, 20.0),
            alignment(30.0, 30.0),
        ]);
        let mut previous = f64::NEG_INFINITY;
        for step in 0..100 {
            let mapped = mapping.map_to_modified(step as f64 * 3.0);
            assert!(
                mapped >= previous,
                "mapping must never decrease, step {step}"
            );
            previous = mapped;
        }
    }

    #[test]
    fn test_padding_eases_towards_target() {
        let mut controller = ScrollSyncController::default();
        controller.set_modified_top_padding(100.0, 0.0);

        assert_eq!(controller.top_padding_at(0.0), 0.0, "starts at the old value");
        let mid = controller.top_padding_at(0.25);
        assert!(
            mid > 50.0 && mid < 100.0,
            "ease-out covers more than half by midpoint, got {mid}"
        );
        assert_eq!(
            controller.top_padding_at(PADDING_EASE_SECONDS),
            100.0,
            "settles exactly on the target"
        );
        assert!(!controller.is_animating(PADDING_EASE_SECONDS));
    }

    #[test]
    fn test_padding_easing_is_monotone() {
        let mut controller = ScrollSyncController::default();
        controller.set_modified_top_padding(80.0, 1.0);

        let mut previous = controller.top_padding_at(1.0);
        for step in 1..=50 {
            let now = 1.0 + step as f64 * 0.01;
            let value = controller.top_padding_at(now);
            assert!(value >= previous, "padding must not move backwards");
            previous = value;
        }
    }

    #[test]
    fn test_retarget_mid_flight_starts_from_current_value() {
        let mut controller = ScrollSyncController::default();
        controller.set_modified_top_padding(100.0, 0.0);
        let mid = controller.top_padding_at(0.2);

        controller.set_modified_top_padding(0.0, 0.2);
        let after = controller.top_padding_at(0.2);
        assert!(
            (after - mid).abs() < 1e-9,
            "no jump when retargeting: {after} vs {mid}"
        );
        assert_eq!(controller.top_padding_at(10.0), 0.0);
    }

    #[test]
    fn test_follow_original_moves_modified_pane() {
        let mapping =
            ScrollMapping::from_alignments(&[alignment(100.0, 100.0), alignment(40.0, 20.0)]);
        let controller = ScrollSyncController::new(mapping);

        let original = ScrollState { top: 200.0, left: 16.0 };
        let mut modified = ScrollState::default();
        controller.follow_original(&original, &mut modified);

        assert_eq!(modified.top, 180.0);
        assert_eq!(modified.left, 16.0, "horizontal scroll mirrors verbatim");
    }

    #[test]
    fn test_sync_dispatches_on_driving_pane() {
        let mapping =
            ScrollMapping::from_alignments(&[alignment(100.0, 100.0), alignment(40.0, 20.0)]);
        let controller = ScrollSyncController::new(mapping);

        let mut original = ScrollState::default();
        let mut modified = ScrollState { top: 180.0, left: 4.0 };
        controller.sync(Pane::Modified, &mut original, &mut modified);

        assert_eq!(original.top, 200.0);
        assert_eq!(original.left, 4.0);
    }
}
