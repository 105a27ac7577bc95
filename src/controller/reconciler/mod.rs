//! # Reconciler
//!
//! Core reconciliation logic for TLS secrets mirrored into ACM.
//!
//! The reconciler:
//! - Resolves a queue key to the current TLS secret
//! - Ignores anything that is not a TLS secret with a machine-generated name
//! - Compares the declared SANs with the SANs on the ACM certificate
//! - Refuses imports that would silently drop more than one SAN
//! - Imports leaf, chain and key under a deterministic ARN
//!
//! It holds no state between calls; retry bookkeeping lives in the work queue.

pub mod diff;
pub mod filter;
pub mod reconcile;
pub mod split;
pub mod types;

// Re-export public API
pub use diff::{set_difference, SanDiff};
pub use filter::{is_eligible_name, is_in_scope};
pub use reconcile::{reconcile, MAX_DROPPED_SANS};
pub use split::{split_bundle, SplitBundle, SplitError};
pub use types::{ReconcileOutcome, Reconciler, ReconcilerError, SkipReason};
