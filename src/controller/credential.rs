//! # Credentials
//!
//! The controller's view of a TLS `Secret`, and the `namespace/name` keys that
//! refer to one in the work queue.

use crate::constants::{TLS_CERT_KEY, TLS_PRIVATE_KEY_KEY};
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

/// A TLS certificate/private-key pair plus the metadata reconciliation needs
#[derive(Clone)]
pub struct Credential {
    /// Object name; also the last segment of the certificate ARN
    pub name: String,
    /// Secret type (`kubernetes.io/tls` for anything in scope)
    pub kind: String,
    /// SANs declared on the secret, in annotation order
    pub declared_sans: Vec<String>,
    /// `tls.crt`: leaf certificate followed by the chain
    pub certificate_pem: Vec<u8>,
    /// `tls.key`
    pub private_key_pem: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("declared_sans", &self.declared_sans)
            .field("certificate_pem_len", &self.certificate_pem.len())
            .field("private_key_pem", &"***")
            .finish()
    }
}

impl Credential {
    /// Build a credential from a Kubernetes secret
    ///
    /// Missing data keys become empty byte strings; the reconciler decides
    /// whether that is fatal once the secret is known to be in scope.
    #[must_use]
    pub fn from_secret(secret: &Secret, alt_names_annotation: &str) -> Self {
        let data = secret.data.as_ref();
        let bytes_of = |key: &str| {
            data.and_then(|d| d.get(key))
                .map(|b| b.0.clone())
                .unwrap_or_default()
        };

        Self {
            name: secret.name_any(),
            kind: secret.type_.clone().unwrap_or_default(),
            declared_sans: parse_alt_names(
                secret
                    .annotations()
                    .get(alt_names_annotation)
                    .map(String::as_str),
            ),
            certificate_pem: bytes_of(TLS_CERT_KEY),
            private_key_pem: Zeroizing::new(bytes_of(TLS_PRIVATE_KEY_KEY)),
        }
    }
}

/// Split a comma separated SAN annotation
///
/// Whitespace around entries is trimmed and empty entries are dropped, so an
/// absent or blank annotation yields no SANs.
#[must_use]
pub fn parse_alt_names(annotation: Option<&str>) -> Vec<String> {
    annotation
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|san| !san.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid object key '{0}': expected 'namespace/name'")]
    Malformed(String),
}

/// `namespace/name` reference to one credential; the unit of work in the queue
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key for a watched secret; `None` if the object has no name
    #[must_use]
    pub fn for_secret(secret: &Secret) -> Option<Self> {
        let name = secret.metadata.name.clone()?;
        let namespace = secret
            .metadata
            .namespace
            .clone()
            .unwrap_or_else(|| "default".to_string());
        Some(Self { namespace, name })
    }

    /// Parse a queue key back into its parts
    ///
    /// # Errors
    ///
    /// Returns `KeyError::Malformed` unless the key is exactly two non-empty
    /// segments separated by `/`.
    pub fn parse(key: &str) -> Result<Self, KeyError> {
        match key.split_once('/') {
            Some((namespace, name))
                if !namespace.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(namespace, name))
            }
            _ => Err(KeyError::Malformed(key.to_string())),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::ByteString;
    use std::collections::BTreeMap;

    fn tls_secret(annotation: Option<&str>) -> Secret {
        let mut secret = Secret::default();
        secret.metadata.name = Some("abcd1-efgh2-ijkl3-mnop4-qrst5".to_string());
        secret.metadata.namespace = Some("certs".to_string());
        secret.type_ = Some("kubernetes.io/tls".to_string());
        if let Some(value) = annotation {
            secret.metadata.annotations = Some(BTreeMap::from([(
                "cert-manager.io/alt-names".to_string(),
                value.to_string(),
            )]));
        }
        secret.data = Some(BTreeMap::from([
            ("tls.crt".to_string(), ByteString(b"CERT".to_vec())),
            ("tls.key".to_string(), ByteString(b"KEY".to_vec())),
        ]));
        secret
    }

    #[test]
    fn test_from_secret_reads_fields() {
        let credential = Credential::from_secret(
            &tls_secret(Some("a.com,b.com")),
            "cert-manager.io/alt-names",
        );
        assert_eq!(credential.name, "abcd1-efgh2-ijkl3-mnop4-qrst5");
        assert_eq!(credential.kind, "kubernetes.io/tls");
        assert_eq!(credential.declared_sans, vec!["a.com", "b.com"]);
        assert_eq!(credential.certificate_pem, b"CERT");
        assert_eq!(credential.private_key_pem.as_slice(), b"KEY");
    }

    #[test]
    fn test_from_secret_without_annotation_has_no_sans() {
        let credential = Credential::from_secret(&tls_secret(None), "cert-manager.io/alt-names");
        assert!(credential.declared_sans.is_empty());
    }

    #[test]
    fn test_from_secret_missing_data_is_empty() {
        let mut secret = tls_secret(None);
        secret.data = None;
        let credential = Credential::from_secret(&secret, "cert-manager.io/alt-names");
        assert!(credential.certificate_pem.is_empty());
        assert!(credential.private_key_pem.is_empty());
    }

    #[test]
    fn test_debug_hides_private_key() {
        let credential = Credential::from_secret(&tls_secret(None), "cert-manager.io/alt-names");
        let rendered = format!("{credential:?}");
        assert!(rendered.contains("***"));
        assert!(!rendered.contains("KEY\""));
    }

    #[test]
    fn test_parse_alt_names_trims_and_drops_empty_entries() {
        assert_eq!(
            parse_alt_names(Some(" a.com , ,b.com,")),
            vec!["a.com".to_string(), "b.com".to_string()]
        );
        assert!(parse_alt_names(Some("")).is_empty());
        assert!(parse_alt_names(None).is_empty());
    }

    #[test]
    fn test_object_key_round_trip() {
        let key = ObjectKey::new("certs", "abc");
        assert_eq!(key.to_string(), "certs/abc");
        assert_eq!(ObjectKey::parse("certs/abc"), Ok(key));
    }

    #[test]
    fn test_object_key_rejects_malformed() {
        for bad in ["", "abc", "/abc", "certs/", "a/b/c"] {
            assert_eq!(
                ObjectKey::parse(bad),
                Err(KeyError::Malformed(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_for_secret_defaults_namespace() {
        let mut secret = tls_secret(None);
        secret.metadata.namespace = None;
        assert_eq!(
            ObjectKey::for_secret(&secret),
            Some(ObjectKey::new("default", "abcd1-efgh2-ijkl3-mnop4-qrst5"))
        );

        secret.metadata.name = None;
        assert_eq!(ObjectKey::for_secret(&secret), None);
    }
}
