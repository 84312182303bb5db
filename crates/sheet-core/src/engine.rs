#![forbid(unsafe_code)]

//! The sheet engine: runtime state, snapping, and derived outputs.
//!
//! [`SheetEngine`] owns everything that changes while the sheet is used: the
//! continuous `location` during a drag, the last settled position, the
//! animation directive, and the outputs a render layer consumes.
//!
//! # State Machine
//!
//! ```text
//!   Idle ──drag sample──▶ Dragging ──drag end──▶ Settling ──finish──▶ Idle
//!     │                      ▲  │                    ▲
//!     │                      └──┘ drag move          │
//!     └────────────── set_position_style ────────────┘
//! ```
//!
//! A geometry change during a drag cancels it: the engine re-snaps and
//! leaves `Dragging`.
//!
//! # Invariants
//!
//! 1. After [`on_ended`](SheetEngine::on_ended),
//!    [`set_position_style`](SheetEngine::set_position_style) or any geometry
//!    setter, `location` equals the height of one of the three available
//!    positions exactly.
//! 2. During a drag, `location` never leaves the band spanned by the
//!    available heights.
//! 3. Every public mutator ends with a single wholesale recomputation of
//!    [`SheetOutputs`]; reading [`outputs`](SheetEngine::outputs) after a
//!    call always sees a consistent snapshot.
//!
//! # Failure Modes
//!
//! The engine has no error paths. Out-of-range drag locations re-snap,
//! fixed anchors are clamped, and non-finite inputs from the platform are
//! ignored.

use crate::animation::AnimationDirective;
use crate::geometry::{
    AnchorRule, BottomOffset, CornerRadiusPolicy, GeometryConfig, Measurements, SafeArea,
    TopOffset,
};
use crate::position::{self, AvailablePositions, Position, PositionStyle};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance for deciding the sheet is at its expanded height.
///
/// `content_height - (location + effective_top)` can be a few ulps off zero
/// when `location` was itself computed as `content_height - effective_top`.
const AT_TOP_TOLERANCE: f64 = 1e-6;

/// Lifecycle phase of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetPhase {
    #[default]
    Idle,
    Dragging,
    /// Snapped to a position; the render layer is animating toward it.
    Settling,
}

/// Construction-time options.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SheetConfig {
    pub initial_position: PositionStyle,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub geometry: GeometryConfig,
    /// Replaces the default snap spring when set.
    pub preferred_animation: Option<AnimationDirective>,
}

impl SheetConfig {
    /// Check that every parameter is usable.
    ///
    /// Returns human-readable problems; empty means valid. The engine
    /// tolerates all of these at runtime by clamping, so this is for catching
    /// configuration mistakes early.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let g = &self.geometry;

        check_offset(&mut errors, "top_offset.value", g.top.value);
        check_offset(&mut errors, "bottom_offset.value", g.bottom.value);
        match g.anchor {
            AnchorRule::Fraction { value, .. } => {
                if !(0.0..=1.0).contains(&value) {
                    errors.push(format!("anchor.fraction.value must be in [0, 1], got {value}"));
                }
            }
            AnchorRule::FixedHeight(height) => {
                check_offset(&mut errors, "anchor.fixed_height", height);
            }
        }
        check_offset(&mut errors, "corner_radius.on_top", g.corner_radius.on_top);
        check_offset(&mut errors, "corner_radius.on_any_other", g.corner_radius.on_any_other);
        check_offset(&mut errors, "header_inset_unit", g.header_inset_unit);

        match self.preferred_animation {
            Some(AnimationDirective::Spring(curve)) => {
                if !(curve.response.is_finite() && curve.response > 0.0) {
                    errors.push(format!(
                        "preferred_animation.spring.response must be > 0, got {}",
                        curve.response
                    ));
                }
                check_offset(
                    &mut errors,
                    "preferred_animation.spring.damping_fraction",
                    curve.damping_fraction,
                );
                check_offset(
                    &mut errors,
                    "preferred_animation.spring.blend_duration",
                    curve.blend_duration,
                );
            }
            Some(AnimationDirective::Custom(curve)) => {
                check_offset(&mut errors, "preferred_animation.custom.duration", curve.duration);
            }
            Some(AnimationDirective::None) | None => {}
        }
        errors
    }
}

fn check_offset(errors: &mut Vec<String>, field: &str, value: f64) {
    if !value.is_finite() {
        errors.push(format!("{field} must be finite, got {value}"));
    } else if value < 0.0 {
        errors.push(format!("{field} must be >= 0, got {value}"));
    }
}

/// A static policy paired with the value currently derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derived<P, V> {
    pub policy: P,
    pub value: V,
}

/// Everything the render layer observes, recomputed wholesale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetOutputs {
    pub location: f64,
    /// Vertical translation of the rendered panel.
    pub y_offset: f64,
    pub position: Position,
    pub phase: SheetPhase,
    pub animation: AnimationDirective,
    /// Inner content may scroll only when the sheet is fully expanded.
    pub is_inner_scroll_enabled: bool,
    /// Inner content may re-layout without fighting an in-flight scroll.
    pub is_inner_scroll_redraw_available: bool,
    /// Header padding; policy is the inset unit.
    pub safe_area_inset: Derived<f64, f64>,
    pub corner_radius: Derived<CornerRadiusPolicy, f64>,
}

/// Positioning engine for a single sheet.
#[derive(Debug, Clone)]
pub struct SheetEngine {
    config: GeometryConfig,
    measurements: Measurements,
    location: f64,
    last_settled: f64,
    current_position: Position,
    phase: SheetPhase,
    animation: AnimationDirective,
    preferred_animation: Option<AnimationDirective>,
    inner_scroll_scrolling: bool,
    outputs: SheetOutputs,
}

impl SheetEngine {
    /// Create an engine with default measurements.
    #[must_use]
    pub fn new(config: SheetConfig) -> Self {
        Self::with_measurements(config, Measurements::default())
    }

    /// Create an engine with known measurements.
    #[must_use]
    pub fn with_measurements(config: SheetConfig, measurements: Measurements) -> Self {
        let positions = position::available_positions(&config.geometry, &measurements);
        let current = positions
            .get(config.initial_position)
            .unwrap_or_else(|| positions.anchored());
        let mut engine = Self {
            config: config.geometry,
            measurements,
            location: current.height,
            last_settled: current.height,
            current_position: current,
            phase: SheetPhase::Idle,
            animation: AnimationDirective::None,
            preferred_animation: config.preferred_animation,
            inner_scroll_scrolling: false,
            outputs: SheetOutputs {
                location: current.height,
                y_offset: 0.0,
                position: current,
                phase: SheetPhase::Idle,
                animation: AnimationDirective::None,
                is_inner_scroll_enabled: false,
                is_inner_scroll_redraw_available: true,
                safe_area_inset: Derived {
                    policy: config.geometry.header_inset_unit,
                    value: 0.0,
                },
                corner_radius: Derived {
                    policy: config.geometry.corner_radius,
                    value: config.geometry.corner_radius.on_any_other,
                },
            },
        };
        engine.recompute();
        engine
    }

    // ── Accessors ───────────────────────────────────────────────────────

    #[inline]
    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    #[inline]
    pub fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    /// Continuous location; the source of truth during a drag.
    #[inline]
    pub fn location(&self) -> f64 {
        self.location
    }

    /// Height the sheet last snapped to; the base for drag translations.
    #[inline]
    pub fn last_settled(&self) -> f64 {
        self.last_settled
    }

    #[inline]
    pub fn current_position(&self) -> Position {
        self.current_position
    }

    #[inline]
    pub fn phase(&self) -> SheetPhase {
        self.phase
    }

    #[inline]
    pub fn animation(&self) -> AnimationDirective {
        self.animation
    }

    #[inline]
    pub fn preferred_animation(&self) -> Option<AnimationDirective> {
        self.preferred_animation
    }

    #[inline]
    pub fn outputs(&self) -> &SheetOutputs {
        &self.outputs
    }

    #[inline]
    pub fn is_inner_scroll_enabled(&self) -> bool {
        self.outputs.is_inner_scroll_enabled
    }

    /// Candidate positions for the current geometry.
    pub fn available_positions(&self) -> AvailablePositions {
        position::available_positions(&self.config, &self.measurements)
    }

    // ── Drag ────────────────────────────────────────────────────────────

    /// Follow a drag to `location`.
    ///
    /// Inside the band spanned by the available heights the sheet follows
    /// continuously. Outside it, the sheet snaps to the nearest position so
    /// it never overscrolls past the extremes.
    pub fn on_changed(&mut self, location: f64) {
        if !location.is_finite() {
            #[cfg(feature = "tracing")]
            tracing::warn!(location, "ignoring non-finite drag location");
            return;
        }
        if self.phase != SheetPhase::Dragging {
            #[cfg(feature = "tracing")]
            tracing::debug!(from = ?self.phase, "drag started");
            self.phase = SheetPhase::Dragging;
        }

        let positions = self.available_positions();
        if positions.contains(location) {
            self.location = location;
            #[cfg(feature = "tracing")]
            tracing::trace!(location, "drag follow");
        } else {
            let nearest = positions.nearest(location);
            #[cfg(feature = "tracing")]
            tracing::debug!(location, to = ?nearest.style, height = nearest.height, "drag clamped");
            self.settle_at(nearest);
        }
        self.animation = AnimationDirective::None;
        self.recompute();
    }

    /// Finish a drag released at (or projected to) `location`.
    pub fn on_ended(&mut self, location: f64) {
        let location = if location.is_finite() {
            location
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!(location, "non-finite release location; snapping from current");
            self.location
        };
        let nearest = self.available_positions().nearest(location);
        #[cfg(feature = "tracing")]
        tracing::debug!(location, to = ?nearest.style, height = nearest.height, "drag ended");
        self.snap_animated(nearest);
    }

    // ── Programmatic control ────────────────────────────────────────────

    /// Jump to the position with `style`, animating like a release.
    pub fn set_position_style(&mut self, style: PositionStyle) {
        let Some(target) = self.available_positions().get(style) else {
            return;
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(?style, height = target.height, "position style requested");
        self.snap_animated(target);
    }

    /// Use `directive` instead of the default snap spring.
    pub fn set_animation(&mut self, directive: AnimationDirective) {
        self.preferred_animation = Some(directive);
    }

    /// Go back to the default snap spring.
    pub fn clear_animation(&mut self) {
        self.preferred_animation = None;
    }

    /// The render layer finished animating the last snap; the directive is
    /// spent.
    pub fn finish_settling(&mut self) {
        if self.phase == SheetPhase::Settling {
            self.phase = SheetPhase::Idle;
            self.animation = AnimationDirective::None;
            #[cfg(feature = "tracing")]
            tracing::debug!("settled");
            self.recompute();
        }
    }

    /// Record whether the inner scroll view is actively scrolling.
    pub fn set_inner_scroll_scrolling(&mut self, scrolling: bool) {
        self.inner_scroll_scrolling = scrolling;
        self.recompute();
    }

    // ── Geometry ────────────────────────────────────────────────────────

    pub fn set_anchor(&mut self, anchor: AnchorRule) {
        self.config.anchor = anchor;
        self.reload_position();
    }

    pub fn set_top_offset(&mut self, top: TopOffset) {
        self.config.top = top;
        self.reload_position();
    }

    pub fn set_bottom_offset(&mut self, bottom: BottomOffset) {
        self.config.bottom = bottom;
        self.reload_position();
    }

    pub fn set_corner_radius_policy(&mut self, policy: CornerRadiusPolicy) {
        self.config.corner_radius = policy;
        self.recompute();
    }

    // ── Measurements ────────────────────────────────────────────────────

    pub fn set_content_height(&mut self, height: f64) {
        if !accept_measurement("content_height", height) {
            return;
        }
        self.measurements.content_height = height;
        self.reflow();
    }

    pub fn set_header_height(&mut self, height: f64) {
        if !accept_measurement("header_height", height) {
            return;
        }
        self.measurements.header_height = height;
        self.reflow();
    }

    pub fn set_safe_area(&mut self, safe_area: SafeArea) {
        if !accept_measurement("safe_area.top", safe_area.top)
            || !accept_measurement("safe_area.bottom", safe_area.bottom)
        {
            return;
        }
        self.measurements.safe_area = safe_area;
        self.reflow();
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn settle_at(&mut self, target: Position) {
        self.last_settled = target.height;
        self.location = target.height;
        self.current_position = target;
    }

    fn snap_animated(&mut self, target: Position) {
        self.settle_at(target);
        self.animation = self
            .preferred_animation
            .unwrap_or(AnimationDirective::DEFAULT_SNAP);
        self.phase = SheetPhase::Settling;
        self.recompute();
    }

    /// Re-snap after a configuration change; cancels an active drag.
    fn reload_position(&mut self) {
        let nearest = self.available_positions().nearest(self.location);
        if self.phase == SheetPhase::Dragging {
            #[cfg(feature = "tracing")]
            tracing::debug!("geometry changed mid-drag; drag cancelled");
            self.phase = SheetPhase::Idle;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(to = ?nearest.style, height = nearest.height, "geometry re-snap");
        self.settle_at(nearest);
        self.recompute();
    }

    /// Follow a layout change: keep the resting style, move to its new height.
    /// During a drag only the outputs refresh.
    fn reflow(&mut self) {
        if self.phase != SheetPhase::Dragging {
            if let Some(target) = self.available_positions().get(self.current_position.style) {
                self.settle_at(target);
            }
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        let positions = self.available_positions();
        let m = &self.measurements;
        let top = positions.expanded().height;
        let effective_top = self.config.top.effective(m.safe_area);
        let policy = self.config.corner_radius;
        let unit = self.config.header_inset_unit;

        let (inset, radius) = if self.config.top.interpolates_insets() {
            let fraction = position::anchor_fraction(self.location, top, m.safe_area.top);
            (
                position::safe_area_inset(fraction, unit),
                position::corner_radius(fraction, &policy),
            )
        } else {
            (0.0, policy.on_any_other)
        };

        self.outputs = SheetOutputs {
            location: self.location,
            y_offset: m.content_height - self.location,
            position: self.current_position,
            phase: self.phase,
            animation: self.animation,
            is_inner_scroll_enabled: (m.content_height - (self.location + effective_top)).abs()
                <= AT_TOP_TOLERANCE,
            is_inner_scroll_redraw_available: self.location == top || !self.inner_scroll_scrolling,
            safe_area_inset: Derived {
                policy: unit,
                value: inset,
            },
            corner_radius: Derived {
                policy,
                value: radius,
            },
        };
    }
}

impl Default for SheetEngine {
    fn default() -> Self {
        Self::new(SheetConfig::default())
    }
}

fn accept_measurement(_name: &'static str, value: f64) -> bool {
    if value.is_finite() {
        return true;
    }
    #[cfg(feature = "tracing")]
    tracing::warn!(measurement = _name, value, "ignoring non-finite measurement");
    false
}
