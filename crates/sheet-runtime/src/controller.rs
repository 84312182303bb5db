#![forbid(unsafe_code)]

//! Sheet controller: the boundary between a render layer and the engine.
//!
//! [`SheetController`] owns a [`SheetEngine`], the [`GestureAdapter`] that
//! feeds it, and a reference animation player. The render layer reports
//! measurements and gesture samples in, and observes outputs through
//! [`Observable`] handles.
//!
//! # Ordering
//!
//! Every inbound call runs mutate, then recompute, then publish. The engine
//! recomputes its outputs before returning; the controller publishes only
//! afterwards, so subscribers always see a consistent snapshot and can never
//! observe the engine mid-mutation.
//!
//! # Rendering
//!
//! `y_offset` is where the sheet belongs. `rendered_y_offset` is where the
//! reference player currently draws it: it tracks `y_offset` directly while
//! dragging and animates with the engine's directive after a snap. Call
//! [`tick`](SheetController::tick) once per frame to advance it; completion
//! returns the engine to [`SheetPhase::Idle`].

use std::time::Duration;

use sheet_core::animation::{Animation, AnimationDirective, Transition};
use sheet_core::engine::{SheetConfig, SheetEngine, SheetOutputs, SheetPhase};
use sheet_core::geometry::{
    AnchorRule, BottomOffset, CornerRadiusPolicy, Measurements, SafeArea, TopOffset,
};
use sheet_core::gesture::{
    DragSample, GestureAdapter, GestureOutcome, GesturePhase, ScrollSample, clamp_inner_offset,
};
use sheet_core::position::{AvailablePositions, Position, PositionStyle};
use tracing::{debug, debug_span};
use web_time::Instant;

use crate::reactive::Observable;

/// Owns a sheet engine and publishes its outputs.
#[derive(Debug)]
pub struct SheetController {
    engine: SheetEngine,
    adapter: GestureAdapter,
    transition: Option<Transition>,
    /// Release velocity in sheet-height units, consumed by the next snap.
    release_velocity: f64,
    rendered_location: f64,

    y_offset: Observable<f64>,
    position: Observable<Position>,
    animation: Observable<AnimationDirective>,
    inner_scroll_enabled: Observable<bool>,
    inner_scroll_redraw_available: Observable<bool>,
    safe_area_inset: Observable<f64>,
    corner_radius: Observable<f64>,
    phase: Observable<SheetPhase>,
    rendered_y_offset: Observable<f64>,
}

impl SheetController {
    /// Controller with default measurements; the render layer is expected to
    /// report real frames before the first draw.
    #[must_use]
    pub fn new(config: SheetConfig) -> Self {
        Self::with_measurements(config, Measurements::default())
    }

    #[must_use]
    pub fn with_measurements(config: SheetConfig, measurements: Measurements) -> Self {
        let engine = SheetEngine::with_measurements(config, measurements);
        let out = *engine.outputs();
        debug!(
            initial = ?out.position.style,
            height = out.position.height,
            content_height = measurements.content_height,
            "sheet controller created"
        );
        Self {
            adapter: GestureAdapter::new(),
            transition: None,
            release_velocity: 0.0,
            rendered_location: out.location,
            y_offset: Observable::new("y_offset", out.y_offset),
            position: Observable::new("position", out.position),
            animation: Observable::new("animation", out.animation),
            inner_scroll_enabled: Observable::new(
                "inner_scroll_enabled",
                out.is_inner_scroll_enabled,
            ),
            inner_scroll_redraw_available: Observable::new(
                "inner_scroll_redraw_available",
                out.is_inner_scroll_redraw_available,
            ),
            safe_area_inset: Observable::new("safe_area_inset", out.safe_area_inset.value),
            corner_radius: Observable::new("corner_radius", out.corner_radius.value),
            phase: Observable::new("phase", out.phase),
            rendered_y_offset: Observable::new("rendered_y_offset", out.y_offset),
            engine,
        }
    }

    // ── Outbound ────────────────────────────────────────────────────────

    #[inline]
    pub fn engine(&self) -> &SheetEngine {
        &self.engine
    }

    #[inline]
    pub fn outputs(&self) -> &SheetOutputs {
        self.engine.outputs()
    }

    pub fn available_positions(&self) -> AvailablePositions {
        self.engine.available_positions()
    }

    pub fn y_offset(&self) -> &Observable<f64> {
        &self.y_offset
    }

    pub fn position(&self) -> &Observable<Position> {
        &self.position
    }

    pub fn animation(&self) -> &Observable<AnimationDirective> {
        &self.animation
    }

    pub fn inner_scroll_enabled(&self) -> &Observable<bool> {
        &self.inner_scroll_enabled
    }

    pub fn inner_scroll_redraw_available(&self) -> &Observable<bool> {
        &self.inner_scroll_redraw_available
    }

    /// Header padding near full expansion.
    pub fn safe_area_inset(&self) -> &Observable<f64> {
        &self.safe_area_inset
    }

    pub fn corner_radius(&self) -> &Observable<f64> {
        &self.corner_radius
    }

    pub fn phase(&self) -> &Observable<SheetPhase> {
        &self.phase
    }

    /// Offset drawn by the reference player this frame.
    pub fn rendered_y_offset(&self) -> &Observable<f64> {
        &self.rendered_y_offset
    }

    /// Whether a snap animation is still playing.
    #[inline]
    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    // ── Inbound: measurements ───────────────────────────────────────────

    pub fn report_content_frame(&mut self, height: f64) {
        self.engine.set_content_height(height);
        self.publish();
    }

    pub fn report_header_frame(&mut self, height: f64) {
        self.engine.set_header_height(height);
        self.publish();
    }

    pub fn report_safe_area_insets(&mut self, top: f64, bottom: f64) {
        self.engine.set_safe_area(SafeArea::new(top, bottom));
        self.publish();
    }

    // ── Inbound: gestures ───────────────────────────────────────────────

    pub fn report_drag_sample(&mut self, sample: DragSample) -> GestureOutcome {
        let outcome = self.adapter.handle_drag(&mut self.engine, sample);
        if outcome == GestureOutcome::Released && sample.velocity_y.is_finite() {
            // Screen y grows downward; sheet height grows upward.
            self.release_velocity = -sample.velocity_y;
        }
        self.publish();
        outcome
    }

    /// Feed an inner-scroll pan sample.
    ///
    /// An inner pan in progress holds off inner redraws until the sheet is
    /// back at the top or the pan ends.
    pub fn report_scroll_sample(&mut self, sample: ScrollSample) -> GestureOutcome {
        let outcome = self.adapter.handle_scroll(&mut self.engine, sample);
        self.engine
            .set_inner_scroll_scrolling(sample.phase == GesturePhase::Changed);
        self.publish();
        outcome
    }

    /// Content offset the inner scroll view should adopt for `offset`.
    pub fn report_inner_content_offset(&self, offset: f64) -> f64 {
        clamp_inner_offset(offset, self.engine.is_inner_scroll_enabled())
    }

    // ── Inbound: programmatic control ───────────────────────────────────

    pub fn set_position_style(&mut self, style: PositionStyle) {
        self.engine.set_position_style(style);
        self.publish();
    }

    pub fn set_animation(&mut self, directive: AnimationDirective) {
        self.engine.set_animation(directive);
        self.publish();
    }

    pub fn set_anchor(&mut self, anchor: AnchorRule) {
        self.abandon_gesture();
        self.engine.set_anchor(anchor);
        self.publish();
    }

    pub fn set_top_offset(&mut self, top: TopOffset) {
        self.abandon_gesture();
        self.engine.set_top_offset(top);
        self.publish();
    }

    pub fn set_bottom_offset(&mut self, bottom: BottomOffset) {
        self.abandon_gesture();
        self.engine.set_bottom_offset(bottom);
        self.publish();
    }

    pub fn set_corner_radius_policy(&mut self, policy: CornerRadiusPolicy) {
        self.engine.set_corner_radius_policy(policy);
        self.publish();
    }

    // ── Frame clock ─────────────────────────────────────────────────────

    /// Advance the reference player by `dt`.
    ///
    /// When the running transition completes the engine leaves
    /// [`SheetPhase::Settling`].
    pub fn tick(&mut self, dt: Duration) {
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        transition.tick(dt);
        self.rendered_location = transition.current();
        if transition.is_complete() {
            self.rendered_location = transition.to();
            self.transition = None;
            debug!(location = self.rendered_location, "snap animation finished");
            self.engine.finish_settling();
        }
        self.publish();
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// A geometry change cancels the drag inside the engine; forget any
    /// scroll hand-over so the next pan starts fresh.
    fn abandon_gesture(&mut self) {
        if self.adapter.is_tracking_scroll() {
            self.adapter.reset();
        }
    }

    /// Align the reference player with the engine after a mutation.
    fn sync_player(&mut self) {
        let location = self.engine.location();
        match self.engine.phase() {
            SheetPhase::Settling => {
                let retarget = self.transition.as_ref().is_none_or(|t| t.to() != location);
                if retarget {
                    let velocity = std::mem::take(&mut self.release_velocity);
                    self.transition = Some(
                        Transition::new(self.rendered_location, location, self.engine.animation())
                            .with_velocity(velocity),
                    );
                    debug!(
                        from = self.rendered_location,
                        to = location,
                        velocity,
                        "snap animation started"
                    );
                }
            }
            SheetPhase::Idle | SheetPhase::Dragging => {
                self.transition = None;
                self.release_velocity = 0.0;
                self.rendered_location = location;
            }
        }
    }

    fn publish(&mut self) {
        self.sync_player();
        let out = *self.engine.outputs();
        let rendered_y_offset = self.engine.measurements().content_height - self.rendered_location;

        let start = Instant::now();
        let span = debug_span!(
            "sheet.publish",
            phase = ?out.phase,
            location = out.location,
            changed = tracing::field::Empty,
            duration_us = tracing::field::Empty
        );
        let _guard = span.enter();

        let changed = [
            self.y_offset.set(out.y_offset),
            self.position.set(out.position),
            self.animation.set(out.animation),
            self.inner_scroll_enabled.set(out.is_inner_scroll_enabled),
            self.inner_scroll_redraw_available
                .set(out.is_inner_scroll_redraw_available),
            self.safe_area_inset.set(out.safe_area_inset.value),
            self.corner_radius.set(out.corner_radius.value),
            self.phase.set(out.phase),
            self.rendered_y_offset.set(rendered_y_offset),
        ]
        .into_iter()
        .filter(|c| *c)
        .count();

        span.record("changed", changed as u64);
        span.record("duration_us", start.elapsed().as_micros() as u64);
    }
}

impl Default for SheetController {
    fn default() -> Self {
        Self::new(SheetConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheet_core::geometry::GeometryConfig;
    use std::cell::RefCell;
    use std::rc::Rc;

    const FRAME: Duration = Duration::from_millis(16);

    /// Expanded 600, anchored 350, collapsed 100.
    fn controller() -> SheetController {
        let config = SheetConfig {
            initial_position: PositionStyle::Anchored,
            geometry: GeometryConfig {
                top: TopOffset::new(0.0, false),
                bottom: BottomOffset::new(100.0, false),
                anchor: AnchorRule::FixedHeight(350.0),
                ..GeometryConfig::default()
            },
            preferred_animation: None,
        };
        SheetController::with_measurements(config, Measurements::with_content_height(600.0))
    }

    fn run_until_idle(c: &mut SheetController) -> usize {
        let mut frames = 0;
        while c.is_animating() {
            c.tick(FRAME);
            frames += 1;
            assert!(frames < 1000, "animation never finished");
        }
        frames
    }

    #[test]
    fn initial_outputs_are_published() {
        let c = controller();
        assert_eq!(c.y_offset().get(), 250.0);
        assert_eq!(c.rendered_y_offset().get(), 250.0);
        assert_eq!(c.position().get().style, PositionStyle::Anchored);
        assert_eq!(c.phase().get(), SheetPhase::Idle);
        assert!(!c.inner_scroll_enabled().get());
    }

    #[test]
    fn drag_publishes_immediately() {
        let mut c = controller();
        c.report_drag_sample(DragSample::changed(500.0, 440.0));
        assert_eq!(c.y_offset().get(), 190.0);
        assert_eq!(c.rendered_y_offset().get(), 190.0);
        assert_eq!(c.phase().get(), SheetPhase::Dragging);
        assert!(!c.is_animating());
    }

    #[test]
    fn release_animates_then_settles() {
        let mut c = controller();
        c.report_drag_sample(DragSample::changed(500.0, 400.0));
        c.report_drag_sample(DragSample::ended(500.0, 400.0, 300.0, -800.0));
        assert_eq!(c.position().get().style, PositionStyle::Expanded);
        assert_eq!(c.y_offset().get(), 0.0);
        assert_eq!(c.phase().get(), SheetPhase::Settling);
        assert!(c.is_animating());
        assert_eq!(c.rendered_y_offset().get(), 150.0);

        let frames = run_until_idle(&mut c);
        assert!(frames > 1);
        assert_eq!(c.rendered_y_offset().get(), 0.0);
        assert_eq!(c.phase().get(), SheetPhase::Idle);
        assert!(c.inner_scroll_enabled().get());
    }

    #[test]
    fn tick_without_animation_is_noop() {
        let mut c = controller();
        let version = c.y_offset().version();
        c.tick(FRAME);
        assert_eq!(c.y_offset().version(), version);
    }

    #[test]
    fn drag_interrupts_running_animation() {
        let mut c = controller();
        c.set_position_style(PositionStyle::Expanded);
        c.tick(FRAME);
        assert!(c.is_animating());

        c.report_drag_sample(DragSample::changed(300.0, 300.0));
        assert!(!c.is_animating());
        assert_eq!(c.phase().get(), SheetPhase::Dragging);
        assert_eq!(c.rendered_y_offset().get(), c.y_offset().get());
    }

    #[test]
    fn custom_animation_runs_for_its_duration() {
        use sheet_core::animation::{Easing, TimedCurve};

        let mut c = controller();
        c.set_animation(AnimationDirective::Custom(TimedCurve::new(0.1, Easing::Linear)));
        c.set_position_style(PositionStyle::Collapsed);
        assert_eq!(c.animation().get(), AnimationDirective::Custom(TimedCurve::new(0.1, Easing::Linear)));

        c.tick(Duration::from_millis(50));
        assert!((c.rendered_y_offset().get() - 375.0).abs() < 1e-6);
        c.tick(Duration::from_millis(50));
        assert!(!c.is_animating());
        assert_eq!(c.rendered_y_offset().get(), 500.0);
    }

    #[test]
    fn outputs_publish_in_declaration_order() {
        let mut c = controller();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let position = c.position().clone();
        let sink = Rc::clone(&seen);
        let _sub = c.y_offset().subscribe(move |y| {
            sink.borrow_mut().push((*y, position.get().style));
        });

        c.set_position_style(PositionStyle::Collapsed);
        // y_offset publishes first; position still reads the previous snapshot.
        assert_eq!(*seen.borrow(), vec![(500.0, PositionStyle::Anchored)]);
        assert_eq!(c.position().get().style, PositionStyle::Collapsed);
    }

    #[test]
    fn inner_pan_holds_off_redraw_below_top() {
        let mut c = controller();
        c.set_position_style(PositionStyle::Expanded);
        run_until_idle(&mut c);
        assert!(c.inner_scroll_redraw_available().get());

        // Scrolled content keeps the pan; the sheet is at the top so redraw
        // stays available.
        let outcome =
            c.report_scroll_sample(ScrollSample::new(GesturePhase::Changed, -40.0, 0.0, 40.0));
        assert_eq!(outcome, GestureOutcome::Ignored);
        assert!(c.inner_scroll_redraw_available().get());
        assert_eq!(c.report_inner_content_offset(40.0), 40.0);
        assert_eq!(c.report_inner_content_offset(-12.0), 0.0);
        c.report_scroll_sample(ScrollSample::new(GesturePhase::Ended, -40.0, 0.0, 40.0));

        // Content at the top: the sheet takes the pan and moves down.
        c.report_scroll_sample(ScrollSample::new(GesturePhase::Changed, 0.0, 0.0, 0.0));
        let outcome =
            c.report_scroll_sample(ScrollSample::new(GesturePhase::Changed, 100.0, 0.0, 0.0));
        assert_eq!(outcome, GestureOutcome::Moved);
        assert_eq!(c.y_offset().get(), 100.0);
        assert!(!c.inner_scroll_redraw_available().get());

        let outcome =
            c.report_scroll_sample(ScrollSample::new(GesturePhase::Ended, 100.0, 0.0, 0.0));
        assert_eq!(outcome, GestureOutcome::Released);
        assert_eq!(c.position().get().style, PositionStyle::Expanded);
        assert!(c.inner_scroll_redraw_available().get());
    }

    #[test]
    fn inner_offset_pinned_when_not_expanded() {
        let c = controller();
        assert_eq!(c.report_inner_content_offset(25.0), 0.0);
        assert_eq!(c.report_inner_content_offset(-5.0), 0.0);
    }

    #[test]
    fn measurements_flow_through() {
        let mut c = controller();
        c.report_content_frame(800.0);
        assert_eq!(c.y_offset().get(), 450.0);
        c.report_safe_area_insets(47.0, 34.0);
        assert_eq!(c.engine().measurements().safe_area, SafeArea::new(47.0, 34.0));
        c.report_header_frame(30.0);
        assert_eq!(c.engine().measurements().header_height, 30.0);
    }

    #[test]
    fn geometry_setter_publishes_resnap() {
        let mut c = controller();
        c.set_bottom_offset(BottomOffset::new(400.0, false));
        assert_eq!(c.position().get().height, 400.0);
        assert_eq!(c.y_offset().get(), 200.0);
        assert_eq!(c.rendered_y_offset().get(), 200.0);
    }

    #[test]
    fn corner_radius_policy_publishes() {
        let mut c = controller();
        c.set_corner_radius_policy(CornerRadiusPolicy::new(20.0, 6.0));
        assert_eq!(c.corner_radius().get(), 6.0);
    }
}
