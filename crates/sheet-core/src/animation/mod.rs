#![forbid(unsafe_code)]

//! Animation directives and a deterministic reference player.
//!
//! The engine never animates anything itself. On every snap it emits an
//! [`AnimationDirective`] that a render layer applies to the offset change.
//! Hosts without a platform animator can play the directive with
//! [`Transition`], which integrates a [`Spring`] or evaluates a
//! [`TimedCurve`] frame by frame.

pub mod spring;
pub mod transition;

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use spring::{Spring, SpringCurve};
pub use transition::Transition;

/// A time-driven animation.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has settled.
    fn is_complete(&self) -> bool;

    /// Normalized progress. Implementations document whether it may leave
    /// `[0.0, 1.0]`.
    fn value(&self) -> f32;

    /// Return to the initial state.
    fn reset(&mut self);
}

/// Easing function over normalized time.
pub type EasingFn = fn(f32) -> f32;

#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

#[inline]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Named easing curves for timed animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Easing {
    Linear,
    EaseIn,
    #[default]
    EaseOut,
    EaseInOut,
}

impl Easing {
    #[must_use]
    pub fn function(self) -> EasingFn {
        match self {
            Self::Linear => linear,
            Self::EaseIn => ease_in,
            Self::EaseOut => ease_out,
            Self::EaseInOut => ease_in_out,
        }
    }
}

/// A fixed-duration eased animation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimedCurve {
    /// Duration in seconds.
    pub duration: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub easing: Easing,
}

impl TimedCurve {
    #[must_use]
    pub const fn new(duration: f64, easing: Easing) -> Self {
        Self { duration, easing }
    }
}

/// How the render layer should animate the most recent offset change.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AnimationDirective {
    /// Apply immediately; used while a finger is down.
    #[default]
    None,
    Spring(SpringCurve),
    Custom(TimedCurve),
}

impl AnimationDirective {
    /// The spring used when no preferred animation is configured.
    pub const DEFAULT_SNAP: Self = Self::Spring(SpringCurve::SNAP);

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}
