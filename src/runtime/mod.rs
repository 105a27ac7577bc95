//! # Runtime
//!
//! Process wiring around the reconciler.
//!
//! - `initialization`: startup of clients, tracing, metrics and probe server
//! - `watch_loop`: secret watch feeding the work queue
//! - `workers`: tasks draining the work queue
//! - `error_policy`: retry bookkeeping and watch error classification
//! - `shutdown`: signal handling and worker draining

pub mod error_policy;
pub mod initialization;
pub mod shutdown;
pub mod watch_loop;
pub mod workers;
