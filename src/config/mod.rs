//! # Configuration
//!
//! - `controller`: environment-driven controller settings
//! - `target`: the immutable account/region pair certificate ARNs are built from

mod controller;
mod target;

pub use controller::ControllerConfig;
pub use target::SyncTarget;
