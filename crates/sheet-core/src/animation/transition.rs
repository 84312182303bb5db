#![forbid(unsafe_code)]

//! Frame-by-frame playback of an [`AnimationDirective`] between two values.

use std::time::Duration;

use super::{Animation, AnimationDirective, EasingFn, Spring, TimedCurve};

#[derive(Debug, Clone)]
enum Driver {
    Immediate,
    Spring(Spring),
    Timed {
        duration: f64,
        elapsed: f64,
        easing: EasingFn,
    },
}

/// Interpolates from one value to another the way a directive describes.
///
/// [`AnimationDirective::None`] completes immediately at the target.
#[derive(Debug, Clone)]
pub struct Transition {
    from: f64,
    to: f64,
    driver: Driver,
}

impl Transition {
    #[must_use]
    pub fn new(from: f64, to: f64, directive: AnimationDirective) -> Self {
        let driver = match directive {
            AnimationDirective::None => Driver::Immediate,
            AnimationDirective::Spring(curve) => Driver::Spring(Spring::new(from, to, curve)),
            AnimationDirective::Custom(TimedCurve { duration, easing }) if duration > 0.0 => {
                Driver::Timed {
                    duration,
                    elapsed: 0.0,
                    easing: easing.function(),
                }
            }
            AnimationDirective::Custom(_) => Driver::Immediate,
        };
        Self { from, to, driver }
    }

    /// Seed a spring-driven transition with an initial velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        if let Driver::Spring(spring) = &mut self.driver {
            spring.impulse(velocity);
        }
        self
    }

    #[inline]
    pub fn from(&self) -> f64 {
        self.from
    }

    #[inline]
    pub fn to(&self) -> f64 {
        self.to
    }

    /// Current interpolated value.
    pub fn current(&self) -> f64 {
        match &self.driver {
            Driver::Immediate => self.to,
            Driver::Spring(spring) => spring.position(),
            Driver::Timed {
                duration,
                elapsed,
                easing,
            } => {
                let t = (elapsed / duration) as f32;
                self.from + (self.to - self.from) * f64::from(easing(t))
            }
        }
    }
}

impl Animation for Transition {
    fn tick(&mut self, dt: Duration) {
        match &mut self.driver {
            Driver::Immediate => {}
            Driver::Spring(spring) => spring.advance(dt),
            Driver::Timed {
                duration, elapsed, ..
            } => {
                *elapsed = (*elapsed + dt.as_secs_f64()).min(*duration);
            }
        }
    }

    fn is_complete(&self) -> bool {
        match &self.driver {
            Driver::Immediate => true,
            Driver::Spring(spring) => spring.is_at_rest(),
            Driver::Timed {
                duration, elapsed, ..
            } => elapsed >= duration,
        }
    }

    /// Normalized progress; spring transitions may briefly exceed 1.0 while
    /// overshooting.
    fn value(&self) -> f32 {
        match &self.driver {
            Driver::Immediate => 1.0,
            Driver::Spring(spring) => spring.progress() as f32,
            Driver::Timed {
                duration, elapsed, ..
            } => (elapsed / duration) as f32,
        }
    }

    fn reset(&mut self) {
        match &mut self.driver {
            Driver::Immediate => {}
            Driver::Spring(spring) => spring.reset(),
            Driver::Timed { elapsed, .. } => *elapsed = 0.0,
        }
    }
}
