//! AWS account identity

use super::context::AwsContext;
use anyhow::{Context, Result};
use tracing::info;

/// Strongly-typed AWS account ID (12-digit string)
///
/// Every S3 Control call is scoped by account, so the id is resolved once per
/// region and carried by the shared client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Deref)]
pub struct AccountId(String);

impl AccountId {
    /// Create an AccountId without asking STS (tests and fakes)
    pub fn new(s: impl Into<String>) -> Self {
        AccountId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Resolve the account the loaded credentials belong to (STS GetCallerIdentity).
///
/// Needs no permissions, so a failure here means the credentials are bad.
pub async fn get_current_account_id(aws: &AwsContext) -> Result<AccountId> {
    let identity = aws
        .sts_client()
        .get_caller_identity()
        .send()
        .await
        .with_context(|| format!("resolving caller identity in {}", aws.region()))?;

    let account = identity
        .account()
        .context("GetCallerIdentity returned no account")?;

    info!(account_id = %account, region = %aws.region(), "Sweeping account");

    Ok(AccountId(account.to_string()))
}
