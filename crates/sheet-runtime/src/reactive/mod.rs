#![forbid(unsafe_code)]

//! Reactive output channels.
//!
//! [`Observable`] publishes one sheet output; [`Subscription`] keeps a
//! callback registered until dropped.

pub mod observable;

pub use observable::{Observable, Subscription};
