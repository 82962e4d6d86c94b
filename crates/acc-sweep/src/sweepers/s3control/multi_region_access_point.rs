use super::MULTI_REGION_ACCESS_POINT;
use crate::aws::SharedRegionalClient;
use crate::aws::s3control::{AsyncOperationStatus, MultiRegionAccessPointSummary};
use crate::sweep::{KindSweeper, PageCursor, Sweepable, TokenCursor};
use crate::wait::{WaitConfig, wait_until};
use acc_sweep_common::{AccountScopedId, ResourceKind};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

/// S3 Multi-Region Access Points.
///
/// Deletion is asynchronous on the AWS side; a sweepable only completes
/// once the delete operation it started has succeeded.
pub struct MultiRegionAccessPointSweeper {
    wait: WaitConfig,
}

impl Default for MultiRegionAccessPointSweeper {
    fn default() -> Self {
        Self {
            wait: WaitConfig::multi_region_access_point(),
        }
    }
}

impl MultiRegionAccessPointSweeper {
    pub fn with_wait(wait: WaitConfig) -> Self {
        Self { wait }
    }
}

impl KindSweeper for MultiRegionAccessPointSweeper {
    type Client = Arc<SharedRegionalClient>;
    type Item = MultiRegionAccessPointSummary;

    fn kind(&self) -> &'static ResourceKind {
        &MULTI_REGION_ACCESS_POINT
    }

    fn pages(
        &self,
        client: &Self::Client,
    ) -> impl PageCursor<Item = MultiRegionAccessPointSummary> {
        let s3control = client.s3control();
        let account_id = client.account_id().to_string();
        TokenCursor::new(move |token| s3control.list_multi_region_access_points(&account_id, token))
    }

    fn build(
        &self,
        client: &Self::Client,
        item: MultiRegionAccessPointSummary,
    ) -> Result<Option<Sweepable>> {
        let name = item
            .name
            .filter(|n| !n.is_empty())
            .context("multi-region access point without a name")?;
        let id = AccountScopedId::new(client.account_id().as_str(), name);
        let encoded = id.encode()?;

        let s3control = client.s3control();
        let wait = self.wait.clone();
        Ok(Some(Sweepable::new(
            MULTI_REGION_ACCESS_POINT.display_name,
            encoded,
            move || {
                let s3control = s3control.clone();
                let wait = wait.clone();
                let AccountScopedId { account_id, name } = id.clone();
                async move {
                    let Some(request_token) = s3control
                        .delete_multi_region_access_point(&account_id, &name)
                        .await?
                    else {
                        return Ok(());
                    };
                    debug!(name = %name, request_token = %request_token, "Waiting for delete to finish");

                    wait_until(
                        wait,
                        || {
                            let status = s3control.describe_multi_region_access_point_operation(
                                &account_id,
                                &request_token,
                            );
                            async move {
                                match status.await? {
                                    AsyncOperationStatus::Succeeded => Ok(true),
                                    AsyncOperationStatus::InProgress(_) => Ok(false),
                                    AsyncOperationStatus::Failed(reason) => {
                                        Err(anyhow::anyhow!("delete operation failed: {reason}"))
                                    }
                                }
                            }
                        },
                        &format!("multi-region access point {name} deletion"),
                    )
                    .await
                }
            },
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
    use mockall::Sequence;
    use mockall::predicate::eq;
    use std::time::Duration;

    fn fast() -> MultiRegionAccessPointSweeper {
        MultiRegionAccessPointSweeper::with_wait(WaitConfig {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            timeout: Duration::from_secs(5),
        })
    }

    fn listing(mock: &mut MockS3ControlOperations, names: &'static [&'static str]) {
        mock.expect_list_multi_region_access_points()
            .times(1)
            .returning(move |_, _| {
                let items = names
                    .iter()
                    .map(|n| MultiRegionAccessPointSummary {
                        name: Some(n.to_string()),
                    })
                    .collect();
                async move { Ok(Page::last(items)) }.boxed()
            });
    }

    #[tokio::test]
    async fn other_regions_are_never_listed() {
        // No expectations: any call on the mock would panic.
        let c = client("us-east-1", MockS3ControlOperations::new());
        let result = sweep_kind(&context("us-east-1"), &fast(), || async { Ok(c.clone()) }).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn waits_for_delete_operation() {
        let mut mock = MockS3ControlOperations::new();
        listing(&mut mock, &["mrap-1"]);
        mock.expect_delete_multi_region_access_point()
            .with(eq(ACCOUNT), eq("mrap-1"))
            .times(1)
            .returning(|_, _| async { Ok(Some("token-1".to_string())) }.boxed());

        let mut seq = Sequence::new();
        mock.expect_describe_multi_region_access_point_operation()
            .with(eq(ACCOUNT), eq("token-1"))
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                async { Ok(AsyncOperationStatus::InProgress("INPROGRESS".into())) }.boxed()
            });
        mock.expect_describe_multi_region_access_point_operation()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| async { Ok(AsyncOperationStatus::Succeeded) }.boxed());

        let c = client("us-west-2", mock);
        let result = sweep_kind(&context("us-west-2"), &fast(), || async { Ok(c.clone()) }).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn already_deleted_does_not_wait() {
        let mut mock = MockS3ControlOperations::new();
        listing(&mut mock, &["gone"]);
        mock.expect_delete_multi_region_access_point()
            .times(1)
            .returning(|_, _| async { Ok(None) }.boxed());
        mock.expect_describe_multi_region_access_point_operation()
            .never();

        let c = client("us-west-2", mock);
        let result = sweep_kind(&context("us-west-2"), &fast(), || async { Ok(c.clone()) }).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn failed_operation_is_reported() {
        let mut mock = MockS3ControlOperations::new();
        listing(&mut mock, &["mrap-bad"]);
        mock.expect_delete_multi_region_access_point()
            .returning(|_, _| async { Ok(Some("token-2".to_string())) }.boxed());
        mock.expect_describe_multi_region_access_point_operation()
            .returning(|_, _| {
                async { Ok(AsyncOperationStatus::Failed("InternalError: nope".into())) }.boxed()
            });

        let c = client("us-west-2", mock);
        let errors = sweep_kind(&context("us-west-2"), &fast(), || async { Ok(c.clone()) })
            .await
            .unwrap_err();

        assert_eq!(errors.len(), 1);
        let text = errors.to_string();
        assert!(
            text.contains(&format!("deleting S3 Multi-Region Access Point ({ACCOUNT}:mrap-bad)")),
            "{text}"
        );
        assert!(text.contains("delete operation failed"), "{text}");
    }
}
