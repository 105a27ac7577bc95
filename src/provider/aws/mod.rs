//! # AWS Providers
//!
//! - `acm`: AWS Certificate Manager client implementing `CertificateStore`
//! - `identity`: caller account resolution through STS
//!
//! Both clients share one SDK config built by [`load_sdk_config`].

mod acm;
mod identity;

pub use acm::AcmCertificateStore;
pub use identity::resolve_account_id;

use aws_config::SdkConfig;

/// Build the AWS SDK config for `region` from the default credential chain
///
/// The default chain covers IRSA (IAM Roles for Service Accounts): the pod's
/// service account annotation `eks.amazonaws.com/role-arn` supplies the role
/// and the projected token is exchanged automatically.
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await
}
