//! Per-region client shared by every sweeper
//!
//! A sweep of one region needs the account id and an S3 Control client.
//! Both are resolved once, on first use, and then shared by every kind swept
//! in that region. Kinds that are gated out by region never trigger it.

use crate::aws::account::{AccountId, get_current_account_id};
use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::s3control::{S3ControlClient, S3ControlOperations};
use acc_sweep_common::regions::partition_for_region;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Backend collaborator handed to discovery functions
#[derive(Clone)]
pub struct SharedRegionalClient {
    region: String,
    account_id: AccountId,
    s3control: Arc<dyn S3ControlOperations>,
}

impl SharedRegionalClient {
    /// Assemble a client from parts (tests and fakes)
    pub fn new(
        region: impl Into<String>,
        account_id: AccountId,
        s3control: Arc<dyn S3ControlOperations>,
    ) -> Self {
        Self {
            region: region.into(),
            account_id,
            s3control,
        }
    }

    /// Load AWS config for `region` and resolve the caller's account.
    pub async fn connect(region: &str, profile: Option<&str>) -> Result<Self> {
        let aws = AwsContext::new(region, profile).await;
        let account_id = get_current_account_id(&aws).await?;
        Ok(Self::new(
            region,
            account_id,
            Arc::new(S3ControlClient::from_context(&aws)),
        ))
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn partition(&self) -> &'static str {
        partition_for_region(&self.region)
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn s3control(&self) -> Arc<dyn S3ControlOperations> {
        self.s3control.clone()
    }
}

impl std::fmt::Debug for SharedRegionalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRegionalClient")
            .field("region", &self.region)
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

/// Lazily connected [`SharedRegionalClient`] for one region
#[derive(Debug)]
pub struct RegionalClients {
    region: String,
    profile: Option<String>,
    cell: OnceCell<Arc<SharedRegionalClient>>,
}

impl RegionalClients {
    pub fn new(region: impl Into<String>, profile: Option<String>) -> Self {
        Self {
            region: region.into(),
            profile,
            cell: OnceCell::new(),
        }
    }

    /// Pre-populated with `client`; `get` never connects.
    pub fn with_client(client: SharedRegionalClient) -> Self {
        Self {
            region: client.region.clone(),
            profile: None,
            cell: OnceCell::new_with(Some(Arc::new(client))),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Get the shared client, connecting on first call.
    ///
    /// Concurrent callers wait for the same connection attempt. A failed
    /// attempt is not cached, so a later caller retries.
    pub async fn get(&self) -> Result<Arc<SharedRegionalClient>> {
        let client = self
            .cell
            .get_or_try_init(|| async {
                debug!(region = %self.region, "Connecting regional client");
                let client =
                    SharedRegionalClient::connect(&self.region, self.profile.as_deref()).await?;
                info!(
                    region = %client.region(),
                    partition = client.partition(),
                    account_id = %client.account_id(),
                    "Connected"
                );
                Ok::<_, anyhow::Error>(Arc::new(client))
            })
            .await
            .with_context(|| format!("connecting to AWS in {}", self.region))?;
        Ok(client.clone())
    }
}
