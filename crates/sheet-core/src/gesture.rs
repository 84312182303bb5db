#![forbid(unsafe_code)]

//! Gesture adapter: turns raw drag and inner-scroll samples into engine calls.
//!
//! The engine only understands sheet heights. Platform gestures report
//! screen-space points where `y` grows downward. [`GestureAdapter`] converts
//! between the two and owns the hand-over from an inner scroll view to the
//! sheet drag.
//!
//! # Drag
//!
//! - Move: `start_y + last_settled - current_y`.
//! - End: `start_y - predicted_end_y + last_settled`. The predicted end point
//!   is used so a quick flick snaps in the direction of motion even if the
//!   finger lifted mid-travel.
//!
//! # Inner scroll bridge
//!
//! When the sheet hosts scrollable content, pans arrive as scroll samples.
//!
//! 1. While inner scrolling is enabled and the content is scrolled more than
//!    [`SCROLL_HANDOVER_SLOP`] points, the scroll view owns the pan and
//!    samples are ignored.
//! 2. The first accepted sample records the translation the scroll view had
//!    already consumed; later translations subtract it so the sheet does not
//!    jump when it takes over.
//! 3. On release, half the velocity is added to the translation as a
//!    projection before snapping.

use crate::engine::SheetEngine;

/// Inner content offset above which the inner scroll view keeps the pan.
pub const SCROLL_HANDOVER_SLOP: f64 = 1.0;

/// Fraction of the release velocity projected onto a scroll translation.
const SCROLL_PROJECTION_FACTOR: f64 = 0.5;

/// Phase of a gesture sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Changed,
    Ended,
}

/// A drag sample in screen coordinates (`y` grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSample {
    pub phase: GesturePhase,
    pub start_y: f64,
    pub current_y: f64,
    /// Where the platform expects the finger to stop given its velocity.
    pub predicted_end_y: f64,
    pub velocity_y: f64,
}

impl DragSample {
    #[must_use]
    pub const fn changed(start_y: f64, current_y: f64) -> Self {
        Self {
            phase: GesturePhase::Changed,
            start_y,
            current_y,
            predicted_end_y: current_y,
            velocity_y: 0.0,
        }
    }

    #[must_use]
    pub const fn ended(start_y: f64, current_y: f64, predicted_end_y: f64, velocity_y: f64) -> Self {
        Self {
            phase: GesturePhase::Ended,
            start_y,
            current_y,
            predicted_end_y,
            velocity_y,
        }
    }
}

/// A pan sample from the inner scroll view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    pub phase: GesturePhase,
    /// Cumulative pan translation since the gesture began.
    pub translation_y: f64,
    pub velocity_y: f64,
    /// Vertical content offset of the inner scroll view.
    pub content_offset_y: f64,
}

impl ScrollSample {
    #[must_use]
    pub const fn new(
        phase: GesturePhase,
        translation_y: f64,
        velocity_y: f64,
        content_offset_y: f64,
    ) -> Self {
        Self {
            phase,
            translation_y,
            velocity_y,
            content_offset_y,
        }
    }
}

/// What the adapter did with a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// The sheet followed the gesture.
    Moved,
    /// The sheet snapped on release.
    Released,
    /// The inner scroll view owns the gesture.
    Ignored,
}

/// Converts gesture samples into [`SheetEngine`] calls.
#[derive(Debug, Clone, Default)]
pub struct GestureAdapter {
    /// Translation already consumed by the inner scroll view when the sheet
    /// took over the current pan.
    scroll_baseline: Option<f64>,
}

impl GestureAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the sheet is currently driving an inner-scroll pan.
    #[inline]
    pub fn is_tracking_scroll(&self) -> bool {
        self.scroll_baseline.is_some()
    }

    /// Feed a drag sample.
    pub fn handle_drag(&mut self, engine: &mut SheetEngine, sample: DragSample) -> GestureOutcome {
        let base = engine.last_settled();
        match sample.phase {
            GesturePhase::Changed => {
                engine.on_changed(sample.start_y + base - sample.current_y);
                GestureOutcome::Moved
            }
            GesturePhase::Ended => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    velocity_y = sample.velocity_y,
                    predicted_end_y = sample.predicted_end_y,
                    "drag released"
                );
                engine.on_ended(sample.start_y - sample.predicted_end_y + base);
                GestureOutcome::Released
            }
        }
    }

    /// Feed an inner-scroll pan sample.
    pub fn handle_scroll(
        &mut self,
        engine: &mut SheetEngine,
        sample: ScrollSample,
    ) -> GestureOutcome {
        if engine.is_inner_scroll_enabled() && sample.content_offset_y > SCROLL_HANDOVER_SLOP {
            if sample.phase == GesturePhase::Ended {
                self.scroll_baseline = None;
            }
            return GestureOutcome::Ignored;
        }

        let baseline = *self.scroll_baseline.get_or_insert_with(|| {
            #[cfg(feature = "tracing")]
            tracing::debug!(consumed = sample.translation_y, "sheet took over inner scroll");
            sample.translation_y
        });
        let translation = sample.translation_y - baseline;
        let base = engine.last_settled();

        match sample.phase {
            GesturePhase::Changed => {
                let content_height = engine.measurements().content_height;
                engine.on_changed(content_height.min(base - translation));
                GestureOutcome::Moved
            }
            GesturePhase::Ended => {
                self.scroll_baseline = None;
                let projected = translation + sample.velocity_y * SCROLL_PROJECTION_FACTOR;
                engine.on_ended(base - projected);
                GestureOutcome::Released
            }
        }
    }

    /// Forget any in-flight scroll hand-over.
    pub fn reset(&mut self) {
        self.scroll_baseline = None;
    }
}

/// Content offset the inner scroll view should show.
///
/// The content never bounces past its top edge, and while inner scrolling is
/// disabled it stays pinned there so the pan moves the sheet instead.
#[must_use]
pub fn clamp_inner_offset(content_offset_y: f64, inner_scroll_enabled: bool) -> f64 {
    if content_offset_y <= 0.0 || !inner_scroll_enabled {
        0.0
    } else {
        content_offset_y
    }
}
