#![forbid(unsafe_code)]

//! Core: the positioning engine for snapping bottom sheets.
//!
//! # Role
//! `sheet-core` is pure geometry and state. It knows nothing about views,
//! platform gesture recognizers, or animation playback; a render layer
//! reports measurements and gesture samples in and reads outputs back.
//!
//! # Primary responsibilities
//! - **Geometry**: offsets, anchor rule, corner-radius policy, measurements.
//! - **Positions**: the three candidate resting heights and the nearest-snap
//!   rule.
//! - **SheetEngine**: drag follow, snap on release, re-snap on geometry
//!   changes, derived outputs (offset, inset, corner radius, inner scroll).
//! - **GestureAdapter**: drag and inner-scroll samples to engine calls.
//! - **Animation**: snap directives plus a deterministic spring/easing player.
//!
//! # How it fits
//! `sheet-runtime` wraps a [`SheetEngine`](engine::SheetEngine) in a
//! controller that publishes outputs as observables.

pub mod animation;
pub mod engine;
pub mod geometry;
pub mod gesture;
pub mod position;

pub use engine::{SheetConfig, SheetEngine, SheetOutputs, SheetPhase};
pub use position::{Position, PositionStyle};
