//! # Credential Filter
//!
//! Allow-list deciding which secrets are mirrored into ACM.

use crate::constants::TLS_SECRET_TYPE;
use crate::controller::credential::Credential;
use regex::Regex;
use std::sync::LazyLock;

/// Five dash-separated alphanumeric groups, e.g. `abcd1-efgh2-ijkl3-mnop4-qrst5`
///
/// Only machine-generated identifiers of this shape are eligible for sync.
static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]+(?:-[A-Za-z0-9]+){4}$")
        .expect("Failed to compile ID_PATTERN - this should never happen")
});

/// Whether `name` has the machine-generated identifier shape
#[must_use]
pub fn is_eligible_name(name: &str) -> bool {
    ID_PATTERN.is_match(name)
}

/// Whether a credential should be synced at all
///
/// Requires the TLS secret type and an eligible name. Anything else is
/// ignored without error.
#[must_use]
pub fn is_in_scope(credential: &Credential) -> bool {
    credential.kind == TLS_SECRET_TYPE && is_eligible_name(&credential.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeroize::Zeroizing;

    fn credential(name: &str, kind: &str) -> Credential {
        Credential {
            name: name.to_string(),
            kind: kind.to_string(),
            declared_sans: vec![],
            certificate_pem: vec![],
            private_key_pem: Zeroizing::new(vec![]),
        }
    }

    #[test]
    fn test_accepts_tls_secret_with_id_name() {
        assert!(is_in_scope(&credential(
            "abcd1-efgh2-ijkl3-mnop4-qrst5",
            "kubernetes.io/tls"
        )));
    }

    #[test]
    fn test_accepts_uuid_shaped_name() {
        assert!(is_eligible_name("6f1c2d3e-aaaa-4bbb-8ccc-0123456789ab"));
    }

    #[test]
    fn test_rejects_wrong_kind() {
        assert!(!is_in_scope(&credential(
            "abcd1-efgh2-ijkl3-mnop4-qrst5",
            "Opaque"
        )));
        assert!(!is_in_scope(&credential("abcd1-efgh2-ijkl3-mnop4-qrst5", "")));
    }

    #[test]
    fn test_rejects_names_without_five_groups() {
        for name in [
            "not-an-id",
            "a-b-c-d",
            "a-b-c-d-e-f",
            "abcd1-efgh2-ijkl3-mnop4-",
            "-efgh2-ijkl3-mnop4-qrst5",
            "abcd1--ijkl3-mnop4-qrst5",
            "abcd1-efgh2-ijkl3-mnop4-qrst5.example",
            "abc_1-efgh2-ijkl3-mnop4-qrst5",
            "",
        ] {
            assert!(!is_eligible_name(name), "{name:?} should not be eligible");
        }
    }
}
