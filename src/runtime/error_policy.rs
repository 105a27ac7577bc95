//! # Error Policy
//!
//! Queue bookkeeping after each reconciliation, and classification of
//! secret watch stream errors.

use crate::controller::queue::WorkQueue;
use crate::controller::reconciler::{ReconcileOutcome, ReconcilerError};
use crate::observability::metrics;
use tracing::{debug, error, info, warn};

/// What happened to a key after its reconciliation result was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Success or terminal skip; retry history cleared
    Forgotten,
    /// Retryable failure; re-queued with backoff
    Requeued,
    /// Non-retryable failure or retries exhausted; key dropped
    Dropped,
}

/// Apply the outcome of one reconciliation to the queue
///
/// Always releases the key with `done`, so a key re-added while in flight is
/// picked up again.
pub fn handle_reconcile_result(
    queue: &WorkQueue,
    key: &str,
    result: &Result<ReconcileOutcome, ReconcilerError>,
    max_retries: u32,
) -> Disposition {
    let disposition = match result {
        Ok(outcome) => {
            debug!("Reconciled {}: {}", key, outcome.as_str());
            queue.forget(key);
            Disposition::Forgotten
        }
        Err(e) if e.is_retryable() && queue.num_requeues(key) < max_retries => {
            let attempt = queue.num_requeues(key) + 1;
            warn!(
                "Reconciliation of {} failed (retry {}/{}): {}",
                key, attempt, max_retries, e
            );
            let delay = queue.add_rate_limited(key);
            let next_retry = chrono::Utc::now()
                + chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::zero());
            info!(
                "Next retry for {} scheduled: {} (in {}ms)",
                key,
                next_retry.to_rfc3339(),
                delay.as_millis()
            );
            metrics::increment_requeues();
            Disposition::Requeued
        }
        Err(e) if e.is_retryable() => {
            error!(
                "Dropping {} after {} retries: {}",
                key,
                queue.num_requeues(key),
                e
            );
            queue.forget(key);
            metrics::increment_dropped("retries-exhausted");
            Disposition::Dropped
        }
        Err(e) => {
            error!("Dropping {}, error is not retryable: {}", key, e);
            queue.forget(key);
            metrics::increment_dropped("non-retryable");
            Disposition::Dropped
        }
    };

    queue.done(key);
    disposition
}

/// Coarse classification of a watch stream error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchErrorKind {
    NotFound,
    Unauthorized,
    Expired,
    TooManyRequests,
    Other,
}

impl WatchErrorKind {
    /// Classify by inspecting the rendered error
    ///
    /// 404 is checked before 401 because a plain-text 404 body surfaces as a
    /// decode error whose chain also mentions the failed watch.
    #[must_use]
    pub fn classify(error_string: &str) -> Self {
        let is_not_found = error_string.contains("ObjectNotFound")
            || error_string.contains("404")
            || error_string.contains("not found");
        if is_not_found {
            return WatchErrorKind::NotFound;
        }
        if error_string.contains("401") || error_string.contains("Unauthorized") {
            return WatchErrorKind::Unauthorized;
        }
        if error_string.contains("410")
            || error_string.contains("too old resource version")
            || error_string.contains("Expired")
            || error_string.contains("Gone")
        {
            return WatchErrorKind::Expired;
        }
        if error_string.contains("429")
            || error_string.contains("storage is (re)initializing")
            || error_string.contains("TooManyRequests")
        {
            return WatchErrorKind::TooManyRequests;
        }
        WatchErrorKind::Other
    }
}

/// Log a watch stream error and return its classification
///
/// The watcher stream carries its own backoff and re-lists after an error;
/// this only decides how loudly to report it.
pub fn handle_watch_stream_error(error_string: &str) -> WatchErrorKind {
    let error_span = tracing::span!(
        tracing::Level::WARN,
        "controller.watch.error",
        error = %error_string
    );
    let _error_guard = error_span.enter();

    let kind = WatchErrorKind::classify(error_string);
    match kind {
        WatchErrorKind::Unauthorized => {
            error!(
                "Secret watch authentication failed (401 Unauthorized), RBAC may have been revoked or the token expired"
            );
            error!("Verify the service account can still list and watch secrets:");
            error!(
                "   kubectl auth can-i watch secrets --as=system:serviceaccount:<namespace>:acm-sync-controller --all-namespaces"
            );
        }
        WatchErrorKind::Expired => {
            info!("Watch resource version expired (410), watch will re-list");
        }
        WatchErrorKind::TooManyRequests => {
            warn!("API server is throttling or reinitializing storage (429), backing off");
        }
        WatchErrorKind::NotFound => {
            warn!("Watch target not found (404): {}", error_string);
        }
        WatchErrorKind::Other => {
            error!("Secret watch stream error: {}", error_string);
        }
    }
    kind
}
