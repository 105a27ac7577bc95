//! # Provider Modules
//!
//! The collaborators reconciliation depends on:
//! - `CertificateStore`: the managed certificate service (ACM)
//! - `CredentialSource`: where TLS credentials are read from (Kubernetes secrets)
//!
//! Both traits are object safe and shared read-only across workers.

use crate::controller::credential::Credential;
use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

// Provider implementations
pub mod aws;
pub mod kubernetes;

/// Certificate as the remote store reports it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteCertificate {
    /// Subject alternative names, in the order the store returns them
    pub subject_alternative_names: Vec<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// Network, throttling or service-side failure; worth retrying
    #[error("transient certificate store error: {0}")]
    Transient(String),
    /// The store rejected the request itself; retrying the same input cannot succeed
    #[error("certificate store rejected request: {0}")]
    Validation(String),
}

impl StoreError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read credential {key}: {message}")]
    Unavailable { key: String, message: String },
}

/// Managed certificate service holding the externally trusted copies
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CertificateStore: Send + Sync {
    /// Look up a certificate by identifier
    ///
    /// Returns `Ok(None)` when no certificate exists under the identifier yet.
    async fn describe(&self, identifier: &str) -> Result<Option<RemoteCertificate>, StoreError>;

    /// Import (or re-import) certificate material under the identifier
    ///
    /// `chain` is empty when the bundle carried no intermediates. Returns the
    /// identifier the store reports for the certificate.
    async fn import(
        &self,
        identifier: &str,
        certificate: &[u8],
        chain: &[u8],
        private_key: &[u8],
    ) -> Result<String, StoreError>;
}

/// Read access to the credentials being mirrored
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Fetch the credential for `namespace/name`; `Ok(None)` if it no longer exists
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Credential>, SourceError>;
}
