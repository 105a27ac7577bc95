//! # Workers
//!
//! Tasks that drain the work queue. Each worker handles one key to
//! completion before asking for the next; the queue keeps a key away from
//! every other worker while it is in flight.

use crate::controller::queue::WorkQueue;
use crate::controller::reconciler::{reconcile, Reconciler};
use crate::runtime::error_policy::handle_reconcile_result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Spawn `count` workers (at least one)
pub fn spawn_workers(
    count: usize,
    queue: &WorkQueue,
    reconciler: &Arc<Reconciler>,
    max_retries: u32,
) -> Vec<JoinHandle<()>> {
    (0..count.max(1))
        .map(|id| {
            tokio::spawn(run_worker(
                id,
                queue.clone(),
                reconciler.clone(),
                max_retries,
            ))
        })
        .collect()
}

/// Process keys until the queue shuts down
pub async fn run_worker(
    id: usize,
    queue: WorkQueue,
    reconciler: Arc<Reconciler>,
    max_retries: u32,
) {
    debug!("Worker {} started", id);

    while let Some(key) = queue.get().await {
        let result = reconcile(&reconciler, &key).await;
        handle_reconcile_result(&queue, &key, &result, max_retries);
    }

    info!("Worker {} stopped", id);
}
