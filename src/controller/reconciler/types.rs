//! # Types
//!
//! Core types for the reconciler.

use crate::config::SyncTarget;
use crate::controller::credential::KeyError;
use crate::controller::reconciler::split::SplitError;
use crate::provider::{CertificateStore, CredentialSource, SourceError, StoreError};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error(transparent)]
    InvalidKey(#[from] KeyError),

    #[error("Credential lookup failed: {0}")]
    CredentialLookup(#[from] SourceError),

    #[error("Failed to describe certificate {identifier}: {source}")]
    Describe {
        identifier: String,
        #[source]
        source: StoreError,
    },

    #[error("Credential {name} is malformed: {reason}")]
    MalformedCredential { name: String, reason: String },

    #[error("Credential {name} has an unusable certificate bundle: {source}")]
    MalformedCertificate {
        name: String,
        #[source]
        source: SplitError,
    },

    #[error("Failed to import certificate {identifier}: {source}")]
    Import {
        identifier: String,
        #[source]
        source: StoreError,
    },
}

impl ReconcilerError {
    /// Whether trying the same key again could succeed
    ///
    /// Bad keys and defective credentials fail identically every time. Lookup
    /// and describe failures are always retried; import failures depend on
    /// whether the store rejected the material itself.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ReconcilerError::CredentialLookup(_) | ReconcilerError::Describe { .. } => true,
            ReconcilerError::Import { source, .. } => source.is_retryable(),
            ReconcilerError::InvalidKey(_)
            | ReconcilerError::MalformedCredential { .. }
            | ReconcilerError::MalformedCertificate { .. } => false,
        }
    }
}

/// Why a reconciliation finished without writing anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The credential no longer exists; deletions are never propagated
    Deleted,
    /// Wrong secret type or a name outside the identifier allow-list
    NotEligible,
    /// More than one remote SAN would be dropped by the import
    Unsafe { extra: Vec<String> },
    /// The remote certificate already covers every declared SAN
    NoChanges,
}

impl SkipReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Deleted => "deleted",
            SkipReason::NotEligible => "not-eligible",
            SkipReason::Unsafe { .. } => "unsafe",
            SkipReason::NoChanges => "no-changes",
        }
    }
}

/// Terminal state of a successful reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Synced { identifier: String },
    Skipped(SkipReason),
}

impl ReconcileOutcome {
    /// Label used for metrics and logs
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileOutcome::Synced { .. } => "synced",
            ReconcileOutcome::Skipped(reason) => reason.as_str(),
        }
    }
}

/// Everything a reconciliation needs; shared read-only by all workers
#[derive(Clone)]
pub struct Reconciler {
    pub source: Arc<dyn CredentialSource>,
    pub store: Arc<dyn CertificateStore>,
    pub target: Arc<SyncTarget>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    #[must_use]
    pub fn new(
        source: Arc<dyn CredentialSource>,
        store: Arc<dyn CertificateStore>,
        target: SyncTarget,
    ) -> Self {
        Self {
            source,
            store,
            target: Arc::new(target),
        }
    }
}
