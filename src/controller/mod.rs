//! # Controller
//!
//! - `backoff`: per-key exponential backoff
//! - `credential`: TLS credential model and queue keys
//! - `queue`: deduplicating, rate-limited work queue
//! - `reconciler`: read-diff-write pipeline for one key
//! - `server`: metrics and probe endpoints

pub mod backoff;
pub mod credential;
pub mod queue;
pub mod reconciler;
pub mod server;
