//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 5000;

/// Default ACM region used for both the client and ARN construction
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default number of workers draining the queue
pub const DEFAULT_WORKER_COUNT: usize = 2;

/// Number of rate-limited requeues a key gets before it is dropped
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default exponential backoff starting value (milliseconds)
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1000;

/// Default exponential backoff maximum value (milliseconds)
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 300_000;

/// How long workers get to finish in-flight reconciliations after shutdown (seconds)
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 30;

/// Secret type written by cert-manager and every other TLS issuer
pub const TLS_SECRET_TYPE: &str = "kubernetes.io/tls";

/// Annotation cert-manager stamps with the comma separated SAN list
pub const DEFAULT_ALT_NAMES_ANNOTATION: &str = "cert-manager.io/alt-names";

/// Secret data key holding the PEM bundle (leaf followed by chain)
pub const TLS_CERT_KEY: &str = "tls.crt";

/// Secret data key holding the PEM private key
pub const TLS_PRIVATE_KEY_KEY: &str = "tls.key";

/// Trailer that closes a PEM certificate block
pub const CERT_END_MARKER: &str = "-----END CERTIFICATE-----";
