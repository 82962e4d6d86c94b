use super::OBJECT_LAMBDA_ACCESS_POINT;
use crate::aws::SharedRegionalClient;
use crate::aws::s3control::ObjectLambdaAccessPointSummary;
use crate::sweep::{KindSweeper, PageCursor, Sweepable, TokenCursor};
use acc_sweep_common::{AccountScopedId, ResourceKind};
use anyhow::Result;
use std::sync::Arc;

pub struct ObjectLambdaAccessPointSweeper;

impl KindSweeper for ObjectLambdaAccessPointSweeper {
    type Client = Arc<SharedRegionalClient>;
    type Item = ObjectLambdaAccessPointSummary;

    fn kind(&self) -> &'static ResourceKind {
        &OBJECT_LAMBDA_ACCESS_POINT
    }

    fn pages(
        &self,
        client: &Self::Client,
    ) -> impl PageCursor<Item = ObjectLambdaAccessPointSummary> {
        let s3control = client.s3control();
        let account_id = client.account_id().to_string();
        TokenCursor::new(move |token| {
            s3control.list_object_lambda_access_points(&account_id, token)
        })
    }

    fn build(
        &self,
        client: &Self::Client,
        item: ObjectLambdaAccessPointSummary,
    ) -> Result<Option<Sweepable>> {
        let id = AccountScopedId::new(client.account_id().as_str(), item.name);
        let encoded = id.encode()?;

        let s3control = client.s3control();
        Ok(Some(Sweepable::new(
            OBJECT_LAMBDA_ACCESS_POINT.display_name,
            encoded,
            move || s3control.delete_object_lambda_access_point(&id.account_id, &id.name),
        )))
    }
}
