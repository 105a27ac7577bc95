//! # ACM Sync Controller
//!
//! Watches Kubernetes TLS secrets and imports them into AWS Certificate
//! Manager under `arn:aws:acm:<region>:<account>:certificate/<secret-name>`.
//!
//! Only secrets named like `xxxx-xxxx-xxxx-xxxx-xxxx` are synchronized. An
//! import is refused when it would remove more than one SAN from the
//! certificate already in ACM.

use acm_sync_controller::cli::Cli;
use acm_sync_controller::config::ControllerConfig;
use acm_sync_controller::runtime::{
    initialization::initialize,
    shutdown::{drain_workers, wait_for_shutdown_signal},
    watch_loop::run_watch_loop,
    workers::spawn_workers,
};
use anyhow::Result;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.apply(ControllerConfig::from_env());

    let init = initialize(config).await?;

    let watch_handle = tokio::spawn(run_watch_loop(
        init.client.clone(),
        init.config.watch_namespace.clone(),
        init.queue.clone(),
        init.server_state.clone(),
    ));

    let workers = spawn_workers(
        init.config.worker_count,
        &init.queue,
        &init.reconciler,
        init.config.max_retries,
    );
    info!("Started {} workers", workers.len());

    wait_for_shutdown_signal().await;
    info!("Initiating graceful shutdown...");

    init.server_state.set_ready(false);
    watch_handle.abort();
    init.queue.shut_down();

    if drain_workers(workers, init.config.shutdown_grace_duration()).await {
        info!("Controller stopped gracefully");
    }

    Ok(())
}
