//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `acm_sync_reconciliations_total{outcome}` - Reconciliations by outcome
//!   (`synced`, `deleted`, `not-eligible`, `unsafe`, `no-changes`, `failed`)
//! - `acm_sync_reconciliation_duration_seconds` - Duration of reconciliations
//! - `acm_sync_unsafe_skips_total` - Imports refused because they would drop SANs
//! - `acm_sync_acm_operations_total{operation}` - ACM calls by operation
//! - `acm_sync_acm_operation_errors_total{operation}` - Failed ACM calls
//! - `acm_sync_acm_operation_duration_seconds{operation}` - Duration of ACM calls
//! - `acm_sync_queue_depth` - Keys waiting in the work queue
//! - `acm_sync_requeues_total` - Rate-limited requeues after retryable failures
//! - `acm_sync_dropped_total{reason}` - Keys dropped without success

use anyhow::Result;
use prometheus::{Histogram, HistogramVec, IntCounter, IntCounterVec, IntGauge, Registry};
use std::sync::{LazyLock, OnceLock};

// Metrics
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();

static RECONCILIATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "acm_sync_reconciliations_total",
            "Total number of reconciliations by outcome",
        ),
        &["outcome"],
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "acm_sync_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static UNSAFE_SKIPS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "acm_sync_unsafe_skips_total",
        "Total number of imports refused because they would drop more than one SAN",
    )
    .expect("Failed to create UNSAFE_SKIPS_TOTAL metric - this should never happen")
});

static ACM_OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "acm_sync_acm_operations_total",
            "Total number of ACM operations by operation",
        ),
        &["operation"],
    )
    .expect("Failed to create ACM_OPERATIONS_TOTAL metric - this should never happen")
});

static ACM_OPERATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "acm_sync_acm_operation_errors_total",
            "Total number of failed ACM operations by operation",
        ),
        &["operation"],
    )
    .expect("Failed to create ACM_OPERATION_ERRORS_TOTAL metric - this should never happen")
});

static ACM_OPERATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "acm_sync_acm_operation_duration_seconds",
            "Duration of ACM operations in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
        &["operation"],
    )
    .expect("Failed to create ACM_OPERATION_DURATION metric - this should never happen")
});

static QUEUE_DEPTH: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new("acm_sync_queue_depth", "Keys waiting in the work queue")
        .expect("Failed to create QUEUE_DEPTH metric - this should never happen")
});

static REQUEUES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "acm_sync_requeues_total",
        "Total number of rate-limited requeues after retryable failures",
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

static DROPPED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "acm_sync_dropped_total",
            "Total number of keys dropped without a successful reconciliation",
        ),
        &["reason"],
    )
    .expect("Failed to create DROPPED_TOTAL metric - this should never happen")
});

/// Register every metric with the process registry
///
/// Safe to call more than once; only the first call registers, and every
/// later call returns the first call's result.
///
/// # Errors
///
/// Fails if a metric collides with one already in the registry.
pub fn register_metrics() -> Result<()> {
    register_once(&REGISTERED, register_all)
}

fn register_once(
    cell: &OnceLock<Result<(), String>>,
    register: impl FnOnce() -> Result<()>,
) -> Result<()> {
    cell.get_or_init(|| register().map_err(|e| format!("{e:#}")))
        .clone()
        .map_err(anyhow::Error::msg)
}

fn register_all() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(UNSAFE_SKIPS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(ACM_OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(ACM_OPERATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(ACM_OPERATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(QUEUE_DEPTH.clone()))?;
    REGISTRY.register(Box::new(REQUEUES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(DROPPED_TOTAL.clone()))?;
    Ok(())
}

/// Snapshot of every registered metric family
pub fn gather() -> Vec<prometheus::proto::MetricFamily> {
    REGISTRY.gather()
}

pub fn increment_reconciliations(outcome: &str) {
    RECONCILIATIONS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

pub fn increment_unsafe_skips() {
    UNSAFE_SKIPS_TOTAL.inc();
}

pub fn record_acm_operation(operation: &str, duration: f64) {
    ACM_OPERATIONS_TOTAL.with_label_values(&[operation]).inc();
    ACM_OPERATION_DURATION
        .with_label_values(&[operation])
        .observe(duration);
}

pub fn increment_acm_operation_errors(operation: &str) {
    ACM_OPERATIONS_TOTAL.with_label_values(&[operation]).inc();
    ACM_OPERATION_ERRORS_TOTAL
        .with_label_values(&[operation])
        .inc();
}

pub fn set_queue_depth(depth: usize) {
    QUEUE_DEPTH.set(i64::try_from(depth).unwrap_or(i64::MAX));
}

pub fn increment_requeues() {
    REQUEUES_TOTAL.inc();
}

pub fn increment_dropped(reason: &str) {
    DROPPED_TOTAL.with_label_values(&[reason]).inc();
}
