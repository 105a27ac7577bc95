//! # Initialization
//!
//! Controller startup: rustls setup, tracing, metrics, probe server,
//! Kubernetes client, AWS clients and identity resolution.

use crate::config::{ControllerConfig, SyncTarget};
use crate::controller::queue::{ItemRateLimiter, WorkQueue};
use crate::controller::reconciler::Reconciler;
use crate::controller::server::{start_server, ServerState};
use crate::observability::{self, logging::LogFormat};
use crate::provider::aws::{load_sdk_config, resolve_account_id, AcmCertificateStore};
use crate::provider::kubernetes::KubeCredentialSource;
use anyhow::{Context, Result};
use kube::Client;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Everything the controller needs once startup has succeeded
pub struct InitializationResult {
    /// Kubernetes client
    pub client: Client,
    /// Reconciler context shared by the workers
    pub reconciler: Arc<Reconciler>,
    /// Queue fed by the watch and drained by the workers
    pub queue: WorkQueue,
    /// Server state for readiness
    pub server_state: Arc<ServerState>,
    /// Effective configuration
    pub config: ControllerConfig,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("reconciler", &self.reconciler)
            .field("server_ready", &self.server_state.ready())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Initialize the controller runtime
///
/// Failing to reach the Kubernetes API, build the AWS clients or resolve the
/// caller's account is fatal.
///
/// # Errors
///
/// Returns the first startup step that failed.
pub async fn initialize(config: ControllerConfig) -> Result<InitializationResult> {
    observability::logging::init_tracing(LogFormat::parse(&config.log_format))?;

    // rustls 0.23 needs a process-wide provider before the first TLS handshake
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    info!("Starting ACM sync controller");
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );
    info!(
        "Configuration: region={}, workers={}, max_retries={}, backoff={}ms..{}ms, namespace={}",
        config.region,
        config.worker_count,
        config.max_retries,
        config.backoff_base_ms,
        config.backoff_max_ms,
        config.watch_namespace.as_deref().unwrap_or("*")
    );

    observability::metrics::register_metrics()?;

    // Readiness stays false until the initial secret list has been queued
    let server_state = Arc::new(ServerState::default());
    let server_state_clone = server_state.clone();
    let metrics_port = config.metrics_port;
    tokio::spawn(async move {
        if let Err(e) = start_server(metrics_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let sdk_config = load_sdk_config(&config.region).await;
    let account_id = resolve_account_id(&sdk_config)
        .await
        .context("Failed to resolve AWS account identity")?;
    info!("Syncing certificates into account {} ({})", account_id, config.region);

    let store = Arc::new(AcmCertificateStore::new(&sdk_config));
    let source = Arc::new(KubeCredentialSource::new(
        client.clone(),
        config.alt_names_annotation.clone(),
    ));
    let reconciler = Arc::new(Reconciler::new(
        source,
        store,
        SyncTarget::new(account_id, config.region.clone()),
    ));

    let queue = WorkQueue::new(ItemRateLimiter::new(
        config.backoff_base_duration(),
        config.backoff_max_duration(),
    ));

    info!("Controller initialized, starting watch loop...");

    Ok(InitializationResult {
        client,
        reconciler,
        queue,
        server_state,
        config,
    })
}
