//! # Work Queue
//!
//! Rate-limited, deduplicating queue of credential keys.
//!
//! Guarantees:
//! - a key is pending at most once (`add` on a pending key is a no-op)
//! - a key is never handed to two workers at the same time; re-adding a key
//!   that is being processed marks it dirty, and it is queued again when the
//!   worker calls `done`
//! - `get` blocks until a key is available and returns `None` once the queue
//!   has been shut down
//!
//! Bookkeeping lives behind a single `std::sync::Mutex`; no lock is ever held
//! across an `.await`.

use crate::controller::backoff::ExponentialBackoff;
use crate::observability::metrics;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Per-key exponential failure rate limiter
#[derive(Debug)]
pub struct ItemRateLimiter {
    base: Duration,
    max: Duration,
    failures: Mutex<HashMap<String, ExponentialBackoff>>,
}

impl ItemRateLimiter {
    #[must_use]
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Delay before `key` may be retried; records one more failure
    pub fn when(&self, key: &str) -> Duration {
        let mut failures = lock(&self.failures);
        failures
            .entry(key.to_string())
            .or_insert_with(|| ExponentialBackoff::new(self.base, self.max))
            .next_backoff()
    }

    /// Failures recorded for `key` since it was last forgotten
    pub fn num_requeues(&self, key: &str) -> u32 {
        lock(&self.failures)
            .get(key)
            .map_or(0, ExponentialBackoff::attempts)
    }

    /// Drop all failure history for `key`
    pub fn forget(&self, key: &str) {
        lock(&self.failures).remove(key);
    }
}

#[derive(Debug, Default)]
struct QueueState {
    /// Keys in the order they will be handed out
    queue: VecDeque<String>,
    /// Keys that need processing (pending, or re-added while in flight)
    dirty: HashSet<String>,
    /// Keys currently held by a worker
    processing: HashSet<String>,
    shutting_down: bool,
}

#[derive(Debug)]
struct Inner {
    state: Mutex<QueueState>,
    notify: Notify,
    limiter: ItemRateLimiter,
}

/// Shared handle to the work queue; clones refer to the same queue
#[derive(Debug, Clone)]
pub struct WorkQueue {
    inner: Arc<Inner>,
}

impl WorkQueue {
    #[must_use]
    pub fn new(limiter: ItemRateLimiter) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState::default()),
                notify: Notify::new(),
                limiter,
            }),
        }
    }

    /// Queue `key` for processing
    ///
    /// No-op when the key is already pending or the queue is shutting down.
    /// When the key is in flight it is marked dirty and re-queued on `done`.
    pub fn add(&self, key: &str) {
        let mut state = lock(&self.inner.state);
        if state.shutting_down {
            debug!("Queue shutting down, ignoring key {}", key);
            return;
        }
        if !state.dirty.insert(key.to_string()) {
            return;
        }
        if state.processing.contains(key) {
            debug!("Key {} is in flight, marked for reprocessing", key);
            return;
        }
        state.queue.push_back(key.to_string());
        metrics::set_queue_depth(state.queue.len());
        drop(state);
        self.inner.notify.notify_one();
    }

    /// Queue `key` once `delay` has elapsed
    pub fn add_after(&self, key: &str, delay: Duration) {
        if delay.is_zero() {
            self.add(key);
            return;
        }
        let queue = self.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            queue.add(&key);
        });
    }

    /// Queue `key` after its next exponential backoff delay; returns the delay
    pub fn add_rate_limited(&self, key: &str) -> Duration {
        let delay = self.inner.limiter.when(key);
        debug!("Requeueing {} in {:?}", key, delay);
        self.add_after(key, delay);
        delay
    }

    /// Reset the backoff history of `key`
    pub fn forget(&self, key: &str) {
        self.inner.limiter.forget(key);
    }

    /// Rate-limited requeues `key` has had since it was last forgotten
    #[must_use]
    pub fn num_requeues(&self, key: &str) -> u32 {
        self.inner.limiter.num_requeues(key)
    }

    /// Wait for the next key
    ///
    /// Returns `None` once the queue is shut down, even if keys are still
    /// pending. The caller must call `done` for every key it receives.
    pub async fn get(&self) -> Option<String> {
        loop {
            // Register interest before inspecting state so a notification sent
            // between the check and the await is not lost.
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = lock(&self.inner.state);
                if state.shutting_down {
                    return None;
                }
                if let Some(key) = state.queue.pop_front() {
                    state.processing.insert(key.clone());
                    state.dirty.remove(&key);
                    metrics::set_queue_depth(state.queue.len());
                    return Some(key);
                }
            }

            notified.await;
        }
    }

    /// Mark `key` as no longer in flight
    ///
    /// If the key was re-added while it was being processed it goes back on
    /// the queue now.
    pub fn done(&self, key: &str) {
        let mut state = lock(&self.inner.state);
        if !state.processing.remove(key) {
            warn!("done() called for key {} that was not in flight", key);
        }
        if state.dirty.contains(key) && !state.shutting_down {
            state.queue.push_back(key.to_string());
            metrics::set_queue_depth(state.queue.len());
            drop(state);
            self.inner.notify.notify_one();
        }
    }

    /// Stop handing out keys and release every blocked `get`
    pub fn shut_down(&self) {
        lock(&self.inner.state).shutting_down = true;
        self.inner.notify.notify_waiters();
    }

    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        lock(&self.inner.state).shutting_down
    }

    /// Number of keys waiting to be handed out
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.inner.state).queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lock a mutex, recovering the guard if a previous holder panicked
///
/// The queue's bookkeeping stays consistent between statements, so a poisoned
/// lock carries no half-applied update.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> WorkQueue {
        WorkQueue::new(ItemRateLimiter::new(
            Duration::from_millis(10),
            Duration::from_millis(100),
        ))
    }

    #[tokio::test]
    async fn test_add_deduplicates_pending_key() {
        let queue = queue();
        queue.add("default/a");
        queue.add("default/a");
        queue.add("default/a");
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.get().await.as_deref(), Some("default/a"));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_keys_are_handed_out_in_fifo_order() {
        let queue = queue();
        queue.add("default/a");
        queue.add("default/b");
        queue.add("default/a");

        assert_eq!(queue.get().await.as_deref(), Some("default/a"));
        assert_eq!(queue.get().await.as_deref(), Some("default/b"));
    }

    #[tokio::test]
    async fn test_add_while_in_flight_requeues_after_done() {
        let queue = queue();
        queue.add("default/a");
        let key = queue.get().await.expect("key");

        // Re-added while a worker holds it: not handed out to anyone else
        queue.add("default/a");
        queue.add("default/a");
        assert!(queue.is_empty());

        queue.done(&key);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.get().await.as_deref(), Some("default/a"));
    }

    #[tokio::test]
    async fn test_done_without_dirty_does_not_requeue() {
        let queue = queue();
        queue.add("default/a");
        let key = queue.get().await.expect("key");
        queue.done(&key);
        assert!(queue.is_empty());

        // Released: can be added again
        queue.add("default/a");
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn test_get_blocks_until_add() {
        let queue = queue();
        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.get().await })
        };
        tokio::task::yield_now().await;
        queue.add("default/late");

        let got = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("get should return")
            .expect("task should not panic");
        assert_eq!(got.as_deref(), Some("default/late"));
    }

    #[tokio::test]
    async fn test_shut_down_releases_blocked_workers() {
        let queue = queue();
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let queue = queue.clone();
                tokio::spawn(async move { queue.get().await })
            })
            .collect();
        tokio::task::yield_now().await;

        queue.shut_down();

        for waiter in waiters {
            let got = tokio::time::timeout(Duration::from_secs(1), waiter)
                .await
                .expect("get should return after shutdown")
                .expect("task should not panic");
            assert!(got.is_none());
        }
    }

    #[tokio::test]
    async fn test_shut_down_stops_accepting_keys() {
        let queue = queue();
        queue.add("default/a");
        queue.shut_down();
        queue.add("default/b");

        assert!(queue.is_shutting_down());
        assert_eq!(queue.len(), 1);
        assert!(queue.get().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_rate_limited_delays_and_counts() {
        let queue = queue();
        queue.add("default/a");
        let key = queue.get().await.expect("key");

        queue.add_rate_limited(&key);
        queue.done(&key);
        assert_eq!(queue.num_requeues(&key), 1);
        assert!(queue.is_empty());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(queue.len(), 1);

        queue.forget(&key);
        assert_eq!(queue.num_requeues(&key), 0);
    }

    #[test]
    fn test_rate_limiter_grows_per_key() {
        let limiter = ItemRateLimiter::new(Duration::from_millis(10), Duration::from_millis(100));
        assert_eq!(limiter.when("a"), Duration::from_millis(10));
        assert_eq!(limiter.when("a"), Duration::from_millis(20));
        assert_eq!(limiter.when("b"), Duration::from_millis(10));
        assert_eq!(limiter.num_requeues("a"), 2);

        limiter.forget("a");
        assert_eq!(limiter.num_requeues("a"), 0);
        assert_eq!(limiter.when("a"), Duration::from_millis(10));
    }
}
