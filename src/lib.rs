//! ACM Sync Controller Library
//!
//! Mirrors Kubernetes TLS secrets into AWS Certificate Manager. Each secret
//! with a machine-generated name is imported under a deterministic ARN, unless
//! the import would silently drop more than one SAN from the certificate
//! already in ACM.
//!
//! ## Quick Start
//!
//! ```rust
//! use acm_sync_controller::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific imports,
//! use the individual modules.

pub mod cli;
pub mod config;
pub mod constants;
pub mod controller;
pub mod observability;
pub mod prelude;
pub mod provider;
pub mod runtime;
