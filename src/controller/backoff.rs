//! # Exponential Backoff
//!
//! Per-key exponential backoff used by the work queue's rate limiter.
//!
//! Each failure doubles the delay, starting from `base` and capped at `max`.
//! With the defaults (1s base, 5m max) the sequence is
//! 1s, 2s, 4s, 8s, 16s, 32s, 64s, 128s, 256s, 300s (max).
//!
//! ## Usage
//!
//! ```rust
//! use acm_sync_controller::controller::backoff::ExponentialBackoff;
//! use std::time::Duration;
//!
//! let mut backoff = ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(300));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(1));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(2));
//! assert_eq!(backoff.next_backoff(), Duration::from_secs(4));
//! ```

use std::time::Duration;

/// Exponential backoff calculator
///
/// Tracks how many times a single key has failed and hands out the delay
/// before its next attempt.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Delay after the first failure
    base: Duration,
    /// Upper bound for any delay
    max: Duration,
    /// Failures recorded so far
    attempts: u32,
}

impl ExponentialBackoff {
    /// Create a new exponential backoff with the given base and maximum delay
    #[must_use]
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            attempts: 0,
        }
    }

    /// Get the next backoff duration and advance the sequence
    ///
    /// Returns `base * 2^attempts`, capped at `max`.
    ///
    /// # Example
    ///
    /// ```
    /// use acm_sync_controller::controller::backoff::ExponentialBackoff;
    /// use std::time::Duration;
    ///
    /// let mut backoff = ExponentialBackoff::new(Duration::from_millis(500), Duration::from_secs(1));
    /// assert_eq!(backoff.next_backoff(), Duration::from_millis(500));
    /// assert_eq!(backoff.next_backoff(), Duration::from_secs(1));
    /// assert_eq!(backoff.next_backoff(), Duration::from_secs(1));
    /// ```
    pub fn next_backoff(&mut self) -> Duration {
        // 2^31 * base is already far beyond any sane max; clamp the exponent so
        // the shift never overflows.
        let factor = 1_u32.checked_shl(self.attempts.min(31)).unwrap_or(u32::MAX);
        let delay = self.base.checked_mul(factor).unwrap_or(self.max).min(self.max);
        self.attempts = self.attempts.saturating_add(1);
        delay
    }

    /// Failures recorded so far
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
