//! # AWS Certificate Manager Client
//!
//! `CertificateStore` backed by ACM `DescribeCertificate` and
//! `ImportCertificate`.
//!
//! SDK errors are classified once here:
//! - not found on describe becomes `Ok(None)`; any other describe failure
//!   is `StoreError::Transient`
//! - import rejections (bad parameter, bad ARN) become `StoreError::Validation`
//! - everything else (throttling, network, 5xx) becomes `StoreError::Transient`

use crate::observability::metrics;
use crate::provider::{CertificateStore, RemoteCertificate, StoreError};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_acm::error::DisplayErrorContext;
use aws_sdk_acm::primitives::Blob;
use aws_sdk_acm::Client as AcmClient;
use std::time::Instant;
use tracing::{debug, info, info_span, Instrument};

/// ACM-backed certificate store
pub struct AcmCertificateStore {
    client: AcmClient,
    region: String,
}

impl std::fmt::Debug for AcmCertificateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcmCertificateStore")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AcmCertificateStore {
    /// Create an ACM client from an already loaded SDK config
    #[must_use]
    pub fn new(sdk_config: &SdkConfig) -> Self {
        let region = sdk_config
            .region()
            .map_or_else(|| "unknown".to_string(), ToString::to_string);
        info!("Created ACM client for region {}", region);
        Self {
            client: AcmClient::new(sdk_config),
            region,
        }
    }
}

#[async_trait]
impl CertificateStore for AcmCertificateStore {
    async fn describe(&self, identifier: &str) -> Result<Option<RemoteCertificate>, StoreError> {
        let span = info_span!(
            "acm.describe_certificate",
            certificate.arn = identifier,
            region = self.region.as_str(),
            operation.success = tracing::field::Empty,
            operation.found = tracing::field::Empty,
            operation.duration_ms = tracing::field::Empty,
        );
        let span_clone = span.clone();
        let start = Instant::now();

        async move {
            let result = self
                .client
                .describe_certificate()
                .certificate_arn(identifier)
                .send()
                .await;
            span_clone.record("operation.duration_ms", start.elapsed().as_millis() as u64);

            match result {
                Ok(output) => {
                    metrics::record_acm_operation("describe", start.elapsed().as_secs_f64());
                    span_clone.record("operation.success", true);
                    span_clone.record("operation.found", true);
                    let subject_alternative_names = output
                        .certificate()
                        .map(|detail| detail.subject_alternative_names().to_vec())
                        .unwrap_or_default();
                    debug!(
                        "ACM certificate {} has SANs {:?}",
                        identifier, subject_alternative_names
                    );
                    Ok(Some(RemoteCertificate {
                        subject_alternative_names,
                    }))
                }
                Err(e) => {
                    let service_error = e.as_service_error();
                    if service_error.is_some_and(|se| se.is_resource_not_found_exception()) {
                        metrics::record_acm_operation("describe", start.elapsed().as_secs_f64());
                        span_clone.record("operation.success", true);
                        span_clone.record("operation.found", false);
                        debug!("ACM certificate {} does not exist yet", identifier);
                        return Ok(None);
                    }

                    span_clone.record("operation.success", false);
                    metrics::increment_acm_operation_errors("describe");
                    let message = format!(
                        "DescribeCertificate {identifier}: {}",
                        DisplayErrorContext(&e)
                    );
                    Err(StoreError::Transient(message))
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn import(
        &self,
        identifier: &str,
        certificate: &[u8],
        chain: &[u8],
        private_key: &[u8],
    ) -> Result<String, StoreError> {
        let span = info_span!(
            "acm.import_certificate",
            certificate.arn = identifier,
            region = self.region.as_str(),
            chain.present = !chain.is_empty(),
            operation.success = tracing::field::Empty,
            operation.duration_ms = tracing::field::Empty,
        );
        let span_clone = span.clone();
        let start = Instant::now();

        async move {
            let chain = (!chain.is_empty()).then(|| Blob::new(chain.to_vec()));
            let result = self
                .client
                .import_certificate()
                .certificate_arn(identifier)
                .certificate(Blob::new(certificate.to_vec()))
                .set_certificate_chain(chain)
                .private_key(Blob::new(private_key.to_vec()))
                .send()
                .await;
            span_clone.record("operation.duration_ms", start.elapsed().as_millis() as u64);

            match result {
                Ok(output) => {
                    metrics::record_acm_operation("import", start.elapsed().as_secs_f64());
                    span_clone.record("operation.success", true);
                    Ok(output
                        .certificate_arn()
                        .map_or_else(|| identifier.to_string(), ToString::to_string))
                }
                Err(e) => {
                    span_clone.record("operation.success", false);
                    metrics::increment_acm_operation_errors("import");
                    let message =
                        format!("ImportCertificate {identifier}: {}", DisplayErrorContext(&e));
                    let rejected = e.as_service_error().is_some_and(|se| {
                        se.is_invalid_parameter_exception()
                            || se.is_invalid_arn_exception()
                            || se.is_resource_not_found_exception()
                    });
                    if rejected {
                        Err(StoreError::Validation(message))
                    } else {
                        Err(StoreError::Transient(message))
                    }
                }
            }
        }
        .instrument(span)
        .await
    }
}
