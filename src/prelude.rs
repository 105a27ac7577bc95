//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use acm_sync_controller::prelude::*;
//! ```

// Collaborator traits - needed for implementing stores and sources
pub use crate::provider::{
    CertificateStore, CredentialSource, RemoteCertificate, SourceError, StoreError,
};

// Reconciler types - core controller functionality
pub use crate::controller::reconciler::{
    reconcile, ReconcileOutcome, Reconciler, ReconcilerError, SkipReason,
};

// Credential model and queue
pub use crate::controller::credential::{Credential, KeyError, ObjectKey};
pub use crate::controller::queue::{ItemRateLimiter, WorkQueue};

// Config types
pub use crate::config::{ControllerConfig, SyncTarget};
