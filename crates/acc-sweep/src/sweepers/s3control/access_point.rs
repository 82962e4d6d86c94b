use super::ACCESS_POINT;
use crate::aws::SharedRegionalClient;
use crate::aws::s3control::AccessPointSummary;
use crate::sweep::{KindSweeper, PageCursor, Sweepable, TokenCursor};
use acc_sweep_common::{AccessPointId, ResourceKind};
use anyhow::{Context, Result};
use std::sync::Arc;

/// S3 access points, including access points on S3 on Outposts.
///
/// The id is derived from the ARN in the listing, which tells the two apart.
pub struct AccessPointSweeper;

impl KindSweeper for AccessPointSweeper {
    type Client = Arc<SharedRegionalClient>;
    type Item = AccessPointSummary;

    fn kind(&self) -> &'static ResourceKind {
        &ACCESS_POINT
    }

    fn pages(&self, client: &Self::Client) -> impl PageCursor<Item = AccessPointSummary> {
        let s3control = client.s3control();
        let account_id = client.account_id().to_string();
        TokenCursor::new(move |token| s3control.list_access_points(&account_id, token))
    }

    fn build(&self, client: &Self::Client, item: AccessPointSummary) -> Result<Option<Sweepable>> {
        let arn = item
            .arn
            .as_deref()
            .with_context(|| format!("access point {} has no ARN", item.name))?;
        let id = AccessPointId::from_arn(arn)?;
        let encoded = id.encode()?;

        let s3control = client.s3control();
        let account_id = id.account_id().to_string();
        let name = id.delete_name();
        Ok(Some(Sweepable::new(
            ACCESS_POINT.display_name,
            encoded,
            move || s3control.delete_access_point(&account_id, &name),
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

    fn summary(name: &str, arn: Option<String>) -> AccessPointSummary {
        AccessPointSummary {
            name: name.to_string(),
            arn,
        }
    }

    fn regular_arn(name: &str) -> String {
        format!("arn:aws:s3:us-west-2:{ACCOUNT}:accesspoint/{name}")
    }

    #[test]
    fn builds_account_scoped_id() {
        let c = client("us-west-2", MockS3ControlOperations::new());
        let sweepable = AccessPointSweeper
            .build(&c, summary("ap-1", Some(regular_arn("ap-1"))))
            .unwrap()
            .unwrap();
        assert_eq!(sweepable.id(), format!("{ACCOUNT}:ap-1"));
        assert_eq!(sweepable.kind(), "S3 Access Point");
    }

    #[test]
    fn builds_outposts_id_from_arn() {
        let arn = format!(
            "arn:aws:s3-outposts:us-west-2:{ACCOUNT}:outpost/op-01ac5d28a6a232904/accesspoint/ap-2"
        );
        let c = client("us-west-2", MockS3ControlOperations::new());
        let sweepable = AccessPointSweeper
            .build(&c, summary("ap-2", Some(arn.clone())))
            .unwrap()
            .unwrap();
        assert_eq!(sweepable.id(), arn);
    }

    #[test]
    fn missing_or_foreign_arn_is_an_error() {
        let c = client("us-west-2", MockS3ControlOperations::new());
        assert!(AccessPointSweeper.build(&c, summary("x", None)).is_err());
        assert!(
            AccessPointSweeper
                .build(
                    &c,
                    summary("x", Some(format!("arn:aws:ec2:us-west-2:{ACCOUNT}:instance/i-1")))
                )
                .is_err()
        );
    }

    #[tokio::test]
    async fn lists_every_page_and_deletes_by_name() {
        let mut mock = MockS3ControlOperations::new();
        mock.expect_list_access_points()
            .withf(|account, token| account == ACCOUNT && token.is_none())
            .times(1)
            .returning(|_, _| {
                async {
                    Ok(Page::new(
                        vec![summary("ap-1", Some(regular_arn("ap-1")))],
                        Some("page-2".into()),
                    ))
                }
                .boxed()
            });
        mock.expect_list_access_points()
            .withf(|_, token| token.as_deref() == Some("page-2"))
            .times(1)
            .returning(|_, _| {
                async { Ok(Page::last(vec![summary("ap-2", Some(regular_arn("ap-2")))])) }
                    .boxed()
            });
        mock.expect_delete_access_point()
            .with(eq(ACCOUNT), eq("ap-1"))
            .times(1)
            .returning(|_, _| async { Ok(()) }.boxed());
        mock.expect_delete_access_point()
            .with(eq(ACCOUNT), eq("ap-2"))
            .times(1)
            .returning(|_, _| async { Ok(()) }.boxed());

        let c = client("us-west-2", mock);
        let result = sweep_kind(&context("us-west-2"), &AccessPointSweeper, || async {
            Ok(c.clone())
        })
        .await;
        assert!(result.is_ok());
    }
}
