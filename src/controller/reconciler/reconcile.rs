//! # Reconciliation Logic
//!
//! Brings one ACM certificate in line with one TLS secret.
//!
//! Pipeline (each step may end the reconciliation):
//! 1. resolve the key to a credential (gone → skipped)
//! 2. allow-list filter (out of scope → skipped)
//! 3. build the certificate ARN
//! 4. describe the remote certificate (absent → empty SAN set)
//! 5. diff SANs: more than one remote SAN dropped → skipped as unsafe,
//!    nothing missing → skipped as already in sync
//! 6. split the bundle into leaf and chain
//! 7. import

use crate::controller::credential::ObjectKey;
use crate::controller::reconciler::diff::SanDiff;
use crate::controller::reconciler::filter::is_in_scope;
use crate::controller::reconciler::split::split_bundle;
use crate::controller::reconciler::types::{
    ReconcileOutcome, Reconciler, ReconcilerError, SkipReason,
};
use crate::observability::metrics;
use std::time::Instant;
use tracing::{debug, info, warn, Instrument};

/// Remote SANs an import may drop before it is considered unsafe
pub const MAX_DROPPED_SANS: usize = 1;

/// Reconcile the credential behind `key`
///
/// Skips are successes: they never trigger a retry. Errors say whether a
/// retry could help via [`ReconcilerError::is_retryable`].
///
/// # Errors
///
/// Returns an error when the key is malformed, a collaborator call fails, or
/// the credential's certificate material is unusable. No remote state is
/// changed on any error path before the import itself.
pub async fn reconcile(
    ctx: &Reconciler,
    key: &str,
) -> Result<ReconcileOutcome, ReconcilerError> {
    let span = tracing::info_span!("controller.reconcile", credential.key = key);
    let start = Instant::now();

    let result = reconcile_inner(ctx, key).instrument(span).await;

    metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());
    match &result {
        Ok(outcome) => metrics::increment_reconciliations(outcome.as_str()),
        Err(_) => metrics::increment_reconciliations("failed"),
    }
    result
}

async fn reconcile_inner(
    ctx: &Reconciler,
    key: &str,
) -> Result<ReconcileOutcome, ReconcilerError> {
    let object_key = ObjectKey::parse(key)?;

    let Some(credential) = ctx
        .source
        .get(&object_key.namespace, &object_key.name)
        .await?
    else {
        info!("Credential {} no longer exists, nothing to do", key);
        return Ok(ReconcileOutcome::Skipped(SkipReason::Deleted));
    };

    if !is_in_scope(&credential) {
        debug!(
            "Ignoring {} (type {:?}) - not an eligible TLS credential",
            key, credential.kind
        );
        return Ok(ReconcileOutcome::Skipped(SkipReason::NotEligible));
    }

    let identifier = ctx.target.certificate_arn(&credential.name);

    let current_sans = ctx
        .store
        .describe(&identifier)
        .await
        .map_err(|source| ReconcilerError::Describe {
            identifier: identifier.clone(),
            source,
        })?
        .map(|remote| remote.subject_alternative_names)
        .unwrap_or_default();

    let diff = SanDiff::compute(&credential.declared_sans, &current_sans);
    if diff.extra.len() > MAX_DROPPED_SANS {
        warn!(
            "Refusing to import {}: it would drop {} SANs from {} (extra={:?}, declared={:?}, current={:?})",
            key,
            diff.extra.len(),
            identifier,
            diff.extra,
            credential.declared_sans,
            current_sans
        );
        metrics::increment_unsafe_skips();
        return Ok(ReconcileOutcome::Skipped(SkipReason::Unsafe {
            extra: diff.extra,
        }));
    }
    if diff.missing.is_empty() {
        info!("Certificate {} already covers all declared SANs, no changes needed", identifier);
        return Ok(ReconcileOutcome::Skipped(SkipReason::NoChanges));
    }
    debug!("Certificate {} is missing SANs {:?}", identifier, diff.missing);

    if credential.private_key_pem.is_empty() {
        return Err(ReconcilerError::MalformedCredential {
            name: credential.name,
            reason: "no private key in tls.key".to_string(),
        });
    }
    let bundle = split_bundle(&credential.certificate_pem).map_err(|source| {
        ReconcilerError::MalformedCertificate {
            name: credential.name.clone(),
            source,
        }
    })?;

    let imported = ctx
        .store
        .import(
            &identifier,
            bundle.leaf,
            bundle.chain,
            &credential.private_key_pem,
        )
        .await
        .map_err(|source| ReconcilerError::Import {
            identifier: identifier.clone(),
            source,
        })?;

    info!("✅ Imported {} into {} (added SANs {:?})", key, imported, diff.missing);
    Ok(ReconcileOutcome::Synced {
        identifier: imported,
    })
}
