//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use std::time::Duration;

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Environment variables are populated from a ConfigMap using `envFrom` in the deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// ACM region
    /// Used for the ACM client and for every certificate ARN the controller builds
    pub region: String,
    /// Number of workers draining the queue concurrently
    pub worker_count: usize,
    /// Rate-limited requeues allowed per key before it is dropped
    pub max_retries: u32,
    /// Exponential backoff starting value (milliseconds)
    pub backoff_base_ms: u64,
    /// Exponential backoff maximum value (milliseconds)
    pub backoff_max_ms: u64,
    /// Port for `/metrics`, `/healthz` and `/readyz`
    pub metrics_port: u16,
    /// Annotation carrying the declared SAN list
    pub alt_names_annotation: String,
    /// Namespace to watch (all namespaces when unset)
    pub watch_namespace: Option<String>,
    /// Log format (json, text)
    pub log_format: String,
    /// How long in-flight reconciliations may run after shutdown is requested (seconds)
    pub shutdown_grace_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            region: DEFAULT_REGION.to_string(),
            worker_count: DEFAULT_WORKER_COUNT,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            backoff_max_ms: DEFAULT_BACKOFF_MAX_MS,
            metrics_port: DEFAULT_METRICS_PORT,
            alt_names_annotation: DEFAULT_ALT_NAMES_ANNOTATION.to_string(),
            watch_namespace: None,
            log_format: "text".to_string(),
            shutdown_grace_secs: DEFAULT_SHUTDOWN_GRACE_SECS,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        use crate::constants::*;
        Self {
            region: env_var_or_default_str("ACM_REGION", DEFAULT_REGION),
            // A zero-worker controller would never drain the queue
            worker_count: env_var_or_default("WORKER_COUNT", DEFAULT_WORKER_COUNT).max(1),
            max_retries: env_var_or_default("MAX_RETRIES", DEFAULT_MAX_RETRIES),
            backoff_base_ms: env_var_or_default("BACKOFF_BASE_MS", DEFAULT_BACKOFF_BASE_MS),
            backoff_max_ms: env_var_or_default("BACKOFF_MAX_MS", DEFAULT_BACKOFF_MAX_MS),
            metrics_port: env_var_or_default("METRICS_PORT", DEFAULT_METRICS_PORT),
            alt_names_annotation: env_var_or_default_str(
                "ALT_NAMES_ANNOTATION",
                DEFAULT_ALT_NAMES_ANNOTATION,
            ),
            watch_namespace: std::env::var("WATCH_NAMESPACE")
                .ok()
                .filter(|ns| !ns.trim().is_empty()),
            log_format: env_var_or_default_str("LOG_FORMAT", "text"),
            shutdown_grace_secs: env_var_or_default(
                "SHUTDOWN_GRACE_SECS",
                DEFAULT_SHUTDOWN_GRACE_SECS,
            ),
        }
    }

    /// Get backoff start duration
    #[must_use]
    pub fn backoff_base_duration(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    /// Get backoff max duration
    #[must_use]
    pub fn backoff_max_duration(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }

    /// Get shutdown grace duration
    #[must_use]
    pub fn shutdown_grace_duration(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
