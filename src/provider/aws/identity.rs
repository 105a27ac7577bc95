//! # Caller Identity
//!
//! Resolves the AWS account the controller runs as. Certificate ARNs embed
//! this account, so the controller cannot start without it.

use anyhow::{Context, Result};
use aws_config::SdkConfig;
use aws_sdk_sts::Client as StsClient;
use tracing::info;

/// Ask STS which account the configured credentials belong to
///
/// # Errors
///
/// Fails when the STS call fails or the response carries no account.
pub async fn resolve_account_id(sdk_config: &SdkConfig) -> Result<String> {
    let client = StsClient::new(sdk_config);
    let identity = client
        .get_caller_identity()
        .send()
        .await
        .context("Failed to call sts:GetCallerIdentity")?;

    let account = identity
        .account()
        .filter(|a| !a.is_empty())
        .context("sts:GetCallerIdentity returned no account")?
        .to_string();

    info!(
        "Resolved caller identity: account={}, arn={}",
        account,
        identity.arn().unwrap_or("unknown")
    );
    Ok(account)
}
