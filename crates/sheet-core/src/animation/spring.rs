#![forbid(unsafe_code)]

//! Damped harmonic oscillator used to play snap animations.
//!
//! The engine describes springs the way touch platforms do, with a
//! [`SpringCurve`] (response, damping fraction, blend duration). [`Spring`]
//! turns that into stiffness and damping for a unit mass and integrates
//!
//!   a = -stiffness × (position - target) - damping × velocity
//!
//! with semi-implicit Euler, subdividing large frames for stability.
//!
//! # Invariants
//!
//! 1. Stiffness is at least [`MIN_STIFFNESS`]; damping is never negative.
//! 2. A spring at rest stays at rest until [`Spring::set_target`] moves the
//!    target by more than the rest threshold, or an impulse is applied.
//! 3. Once at rest, `position() == target()` exactly.

use std::f64::consts::PI;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Animation;

/// Maximum dt per integration step (4ms).
const MAX_STEP_SECS: f64 = 0.004;

/// Position delta below which the spring may come to rest, in points.
const DEFAULT_REST_THRESHOLD: f64 = 0.01;

/// Velocity below which the spring may come to rest, in points per second.
const DEFAULT_VELOCITY_THRESHOLD: f64 = 0.1;

pub const MIN_STIFFNESS: f64 = 0.1;

/// Shortest response accepted; shorter values make the integration unstable.
const MIN_RESPONSE: f64 = 0.01;

/// Platform-style spring description.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpringCurve {
    /// Approximate period of the undamped oscillation, in seconds.
    pub response: f64,
    /// 1.0 is critically damped; below oscillates.
    pub damping_fraction: f64,
    /// Seconds over which a retargeted animation blends into this one.
    pub blend_duration: f64,
}

impl SpringCurve {
    /// Snap curve applied on release.
    pub const SNAP: Self = Self::new(0.2, 0.9, 0.9);

    #[must_use]
    pub const fn new(response: f64, damping_fraction: f64, blend_duration: f64) -> Self {
        Self {
            response,
            damping_fraction,
            blend_duration,
        }
    }

    /// Stiffness for a unit mass: `(2π / response)²`.
    #[must_use]
    pub fn stiffness(&self) -> f64 {
        let omega = 2.0 * PI / self.response.max(MIN_RESPONSE);
        omega * omega
    }

    /// Damping coefficient for a unit mass: `4π·ζ / response`.
    #[must_use]
    pub fn damping(&self) -> f64 {
        4.0 * PI * self.damping_fraction.max(0.0) / self.response.max(MIN_RESPONSE)
    }
}

impl Default for SpringCurve {
    fn default() -> Self {
        Self::SNAP
    }
}

/// A spring moving a position toward a target.
#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    initial: f64,
    stiffness: f64,
    damping: f64,
    rest_threshold: f64,
    velocity_threshold: f64,
    at_rest: bool,
}

impl Spring {
    /// Spring from `initial` to `target` shaped by `curve`.
    #[must_use]
    pub fn new(initial: f64, target: f64, curve: SpringCurve) -> Self {
        Self {
            position: initial,
            velocity: 0.0,
            target,
            initial,
            stiffness: curve.stiffness().max(MIN_STIFFNESS),
            damping: curve.damping(),
            rest_threshold: DEFAULT_REST_THRESHOLD,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            at_rest: false,
        }
    }

    /// Set the starting velocity (builder pattern), e.g. the release velocity
    /// of a drag.
    #[must_use]
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity;
        self
    }

    #[must_use]
    pub fn with_rest_threshold(mut self, threshold: f64) -> Self {
        self.rest_threshold = threshold.abs();
        self
    }

    #[must_use]
    pub fn with_velocity_threshold(mut self, threshold: f64) -> Self {
        self.velocity_threshold = threshold.abs();
        self
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    #[must_use]
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    #[inline]
    #[must_use]
    pub fn damping(&self) -> f64 {
        self.damping
    }

    #[inline]
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// Retarget; keeps the current velocity so the motion stays continuous.
    pub fn set_target(&mut self, target: f64) {
        if (self.target - target).abs() > self.rest_threshold {
            self.target = target;
            self.at_rest = false;
        }
    }

    /// Add to the velocity. Wakes the spring.
    pub fn impulse(&mut self, velocity_delta: f64) {
        self.velocity += velocity_delta;
        self.at_rest = false;
    }

    fn step(&mut self, dt: f64) {
        let displacement = self.position - self.target;
        let acceleration = -self.stiffness * displacement - self.damping * self.velocity;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Advance by `dt`, subdividing into steps of at most 4ms.
    pub fn advance(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }
        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 {
            let step_dt = remaining.min(MAX_STEP_SECS);
            self.step(step_dt);
            remaining -= step_dt;
        }
        if (self.position - self.target).abs() < self.rest_threshold
            && self.velocity.abs() < self.velocity_threshold
        {
            self.position = self.target;
            self.velocity = 0.0;
            self.at_rest = true;
        }
    }

    /// Fraction of the distance from `initial` to `target` covered so far.
    /// May exceed 1.0 while overshooting.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let span = self.target - self.initial;
        if span == 0.0 {
            return if self.at_rest { 1.0 } else { 0.0 };
        }
        (self.position - self.initial) / span
    }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        self.advance(dt);
    }

    fn is_complete(&self) -> bool {
        self.at_rest
    }

    /// Progress clamped to `[0.0, 1.0]`.
    fn value(&self) -> f32 {
        (self.progress() as f32).clamp(0.0, 1.0)
    }

    fn reset(&mut self) {
        self.position = self.initial;
        self.velocity = 0.0;
        self.at_rest = false;
    }
}
