//! # Shutdown
//!
//! Signal handling and worker draining.

use futures::future::join_all;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Resolve on the first SIGINT or SIGTERM
///
/// Kubernetes stops pods with SIGTERM; SIGINT covers local runs.
pub async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT"),
        () = terminate => info!("Received SIGTERM"),
    }
}

/// Wait for every worker to finish, giving up after `grace`
///
/// Returns `true` when all workers finished in time. Workers still running
/// after the grace period are aborted.
pub async fn drain_workers(workers: Vec<JoinHandle<()>>, grace: Duration) -> bool {
    let abort_handles: Vec<_> = workers.iter().map(JoinHandle::abort_handle).collect();

    match tokio::time::timeout(grace, join_all(workers)).await {
        Ok(results) => {
            for result in results {
                if let Err(e) = result {
                    warn!("Worker ended abnormally: {}", e);
                }
            }
            true
        }
        Err(_) => {
            warn!(
                "Workers did not finish within {}s, aborting in-flight reconciliations",
                grace.as_secs()
            );
            for handle in abort_handles {
                handle.abort();
            }
            false
        }
    }
}
