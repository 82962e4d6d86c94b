use super::STORAGE_LENS_CONFIGURATION;
use crate::aws::SharedRegionalClient;
use crate::aws::s3control::StorageLensConfigurationSummary;
use crate::sweep::{KindSweeper, PageCursor, Sweepable, TokenCursor};
use acc_sweep_common::{AccountScopedId, ResourceKind};
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// Dashboard every account gets from AWS; it cannot be deleted.
pub const DEFAULT_DASHBOARD_ID: &str = "default-account-dashboard";

pub struct StorageLensConfigurationSweeper;

impl KindSweeper for StorageLensConfigurationSweeper {
    type Client = Arc<SharedRegionalClient>;
    type Item = StorageLensConfigurationSummary;

    fn kind(&self) -> &'static ResourceKind {
        &STORAGE_LENS_CONFIGURATION
    }

    fn pages(
        &self,
        client: &Self::Client,
    ) -> impl PageCursor<Item = StorageLensConfigurationSummary> {
        let s3control = client.s3control();
        let account_id = client.account_id().to_string();
        TokenCursor::new(move |token| {
            s3control.list_storage_lens_configurations(&account_id, token)
        })
    }

    fn build(
        &self,
        client: &Self::Client,
        item: StorageLensConfigurationSummary,
    ) -> Result<Option<Sweepable>> {
        if item.id == DEFAULT_DASHBOARD_ID {
            debug!("Leaving the default Storage Lens dashboard in place");
            return Ok(None);
        }

        let id = AccountScopedId::new(client.account_id().as_str(), item.id);
        let encoded = id.encode()?;

        let s3control = client.s3control();
        Ok(Some(Sweepable::new(
            STORAGE_LENS_CONFIGURATION.display_name,
            encoded,
            move || s3control.delete_storage_lens_configuration(&id.account_id, &id.name),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{ACCOUNT, client, context};
    use super::*;
    use crate::aws::Page;
    use crate::aws::s3control::MockS3ControlOperations;
    use crate::sweep::sweep_kind;
    use futures::FutureExt;
    use mockall::predicate::eq;

    fn config(id: &str) -> StorageLensConfigurationSummary {
        StorageLensConfigurationSummary {
            id: id.to_string(),
        }
    }

    #[test]
    fn default_dashboard_is_excluded() {
        let c = client("us-east-1", MockS3ControlOperations::new());
        let built = StorageLensConfigurationSweeper
            .build(&c, config(DEFAULT_DASHBOARD_ID))
            .unwrap();
        assert!(built.is_none());
    }

    #[tokio::test]
    async fn sweeps_everything_but_the_default_dashboard() {
        let mut mock = MockS3ControlOperations::new();
        mock.expect_list_storage_lens_configurations()
            .times(1)
            .returning(|_, _| {
                async { Ok(Page::last(vec![config(DEFAULT_DASHBOARD_ID), config("tf-acc-lens")])) }
                    .boxed()
            });
        mock.expect_delete_storage_lens_configuration()
            .with(eq(ACCOUNT), eq("tf-acc-lens"))
            .times(1)
            .returning(|_, _| async { Ok(()) }.boxed());

        let c = client("us-east-1", mock);
        let result = sweep_kind(
            &context("us-east-1"),
            &StorageLensConfigurationSweeper,
            || async { Ok(c.clone()) },
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn gov_cloud_is_never_listed() {
        for region in ["us-gov-east-1", "us-gov-west-1"] {
            let c = client(region, MockS3ControlOperations::new());
            let result = sweep_kind(
                &context(region),
                &StorageLensConfigurationSweeper,
                || async { Ok(c.clone()) },
            )
            .await;
            assert!(result.is_ok());
        }
    }
}
