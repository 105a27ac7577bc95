//! # Kubernetes Credential Source
//!
//! Reads TLS secrets straight from the API server. Every reconciliation sees
//! the latest stored object rather than the copy carried by the watch event.

use crate::controller::credential::Credential;
use crate::provider::{CredentialSource, SourceError};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};

/// `CredentialSource` over `core/v1` secrets
#[derive(Clone)]
pub struct KubeCredentialSource {
    client: Client,
    alt_names_annotation: String,
}

impl std::fmt::Debug for KubeCredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeCredentialSource")
            .field("alt_names_annotation", &self.alt_names_annotation)
            .finish_non_exhaustive()
    }
}

impl KubeCredentialSource {
    #[must_use]
    pub fn new(client: Client, alt_names_annotation: impl Into<String>) -> Self {
        Self {
            client,
            alt_names_annotation: alt_names_annotation.into(),
        }
    }
}

#[async_trait]
impl CredentialSource for KubeCredentialSource {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<Credential>, SourceError> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        match secrets.get_opt(name).await {
            Ok(secret) => Ok(secret
                .as_ref()
                .map(|s| Credential::from_secret(s, &self.alt_names_annotation))),
            Err(e) => Err(SourceError::Unavailable {
                key: format!("{namespace}/{name}"),
                message: e.to_string(),
            }),
        }
    }
}
