//! # Sync Target
//!
//! The AWS account and region every certificate ARN is built from.

/// Immutable identity of the ACM store the controller writes to
///
/// Built once at startup from the resolved caller identity and the configured
/// region, then shared by reference with every reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    account_id: String,
    region: String,
}

impl SyncTarget {
    #[must_use]
    pub fn new(account_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            region: region.into(),
        }
    }

    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Deterministic ARN for the certificate mirroring `credential_name`
    ///
    /// Format: `arn:aws:acm:{region}:{account}:certificate/{name}`
    #[must_use]
    pub fn certificate_arn(&self, credential_name: &str) -> String {
        format!(
            "arn:aws:acm:{}:{}:certificate/{}",
            self.region, self.account_id, credential_name
        )
    }
}
