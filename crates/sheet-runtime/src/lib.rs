#![forbid(unsafe_code)]

//! Runtime: observable outputs and configuration for `sheet-core`.
//!
//! # Role
//! `sheet-runtime` is what a render layer talks to. It wraps a
//! [`SheetEngine`](sheet_core::SheetEngine) in a [`SheetController`] that
//! publishes every output as an [`Observable`](reactive::Observable) and
//! plays snap animations frame by frame.
//!
//! # Key modules
//! - [`controller`]: inbound reports and setters, outbound observables, the
//!   frame clock.
//! - [`reactive`]: observable values and subscription guards.
//! - [`config`]: `SheetConfig` from TOML/JSON (behind the `config` feature)
//!   plus validation.

pub mod config;
pub mod controller;
pub mod reactive;

pub use config::ConfigError;
pub use controller::SheetController;
pub use reactive::{Observable, Subscription};

pub use sheet_core;
