//! S3 Control listing and deletion
//!
//! [`S3ControlOperations`] is the narrow surface the S3 Control sweepers
//! need: one paginated list call and one delete call per resource kind.
//! Every future is `'static` so that deletion closures can own a clone of
//! the client and outlive the discovery that built them.

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::{from_sdk_error, ignore_not_found};
use anyhow::{Context, Result};
use aws_sdk_s3control::Client;
use aws_sdk_s3control::types::DeleteMultiRegionAccessPointInput;
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, info};

/// One page of a listing call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Continuation token; `None` on the last page
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }

    /// A page with no continuation
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

/// Access point as returned by `ListAccessPoints`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPointSummary {
    pub name: String,
    pub arn: Option<String>,
}

/// Multi-Region Access Point as returned by `ListMultiRegionAccessPoints`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiRegionAccessPointSummary {
    pub name: Option<String>,
}

/// Object Lambda Access Point as returned by `ListAccessPointsForObjectLambda`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLambdaAccessPointSummary {
    pub name: String,
}

/// Storage Lens configuration as returned by `ListStorageLensConfigurations`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLensConfigurationSummary {
    pub id: String,
}

/// Status of an asynchronous Multi-Region Access Point operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsyncOperationStatus {
    InProgress(String),
    Succeeded,
    Failed(String),
}

impl AsyncOperationStatus {
    pub fn from_request_status(status: &str, detail: Option<String>) -> Self {
        match status {
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed(detail.unwrap_or_else(|| "no failure reason".to_string())),
            other => Self::InProgress(other.to_string()),
        }
    }
}

/// S3 Control operations used by the sweepers.
///
/// Deletes absorb "not found" so calling them twice is safe.
#[cfg_attr(test, mockall::automock)]
pub trait S3ControlOperations: Send + Sync {
    fn list_access_points(
        &self,
        account_id: &str,
        next_token: Option<String>,
    ) -> BoxFuture<'static, Result<Page<AccessPointSummary>>>;

    fn delete_access_point(&self, account_id: &str, name: &str) -> BoxFuture<'static, Result<()>>;

    fn list_multi_region_access_points(
        &self,
        account_id: &str,
        next_token: Option<String>,
    ) -> BoxFuture<'static, Result<Page<MultiRegionAccessPointSummary>>>;

    /// Start an asynchronous delete. Returns the request token to poll, or
    /// `None` if the access point is already gone.
    fn delete_multi_region_access_point(
        &self,
        account_id: &str,
        name: &str,
    ) -> BoxFuture<'static, Result<Option<String>>>;

    fn describe_multi_region_access_point_operation(
        &self,
        account_id: &str,
        request_token: &str,
    ) -> BoxFuture<'static, Result<AsyncOperationStatus>>;

    fn list_object_lambda_access_points(
        &self,
        account_id: &str,
        next_token: Option<String>,
    ) -> BoxFuture<'static, Result<Page<ObjectLambdaAccessPointSummary>>>;

    fn delete_object_lambda_access_point(
        &self,
        account_id: &str,
        name: &str,
    ) -> BoxFuture<'static, Result<()>>;

    fn list_storage_lens_configurations(
        &self,
        account_id: &str,
        next_token: Option<String>,
    ) -> BoxFuture<'static, Result<Page<StorageLensConfigurationSummary>>>;

    fn delete_storage_lens_configuration(
        &self,
        account_id: &str,
        config_id: &str,
    ) -> BoxFuture<'static, Result<()>>;
}

/// SDK-backed S3 Control client
#[derive(Clone)]
pub struct S3ControlClient {
    client: Client,
}

impl FromAwsContext for S3ControlClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.s3control_client(),
        }
    }
}

/// Treat an empty continuation token as the end of the listing.
fn token(next: Option<&str>) -> Option<String> {
    next.filter(|t| !t.is_empty()).map(str::to_string)
}

/// Outcome of a delete call. `Ok(None)` when the resource was already gone.
///
/// Every S3 Control delete goes through here, so deleting the same resource
/// twice succeeds both times.
pub(crate) fn finish_delete<T>(what: &str, id: &str, result: Result<T>) -> Result<Option<T>> {
    let outcome = ignore_not_found(result).with_context(|| format!("Failed to delete {what} {id}"))?;
    match &outcome {
        Some(_) => debug!(id = %id, "Deleted {what}"),
        None => debug!(id = %id, "{what} already deleted"),
    }
    Ok(outcome)
}

impl S3ControlOperations for S3ControlClient {
    fn list_access_points(
        &self,
        account_id: &str,
        next_token: Option<String>,
    ) -> BoxFuture<'static, Result<Page<AccessPointSummary>>> {
        let client = self.client.clone();
        let account_id = account_id.to_string();
        async move {
            let output = client
                .list_access_points()
                .account_id(account_id)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| from_sdk_error(&e))
                .context("Failed to list access points")?;

            let items = output
                .access_point_list()
                .iter()
                .map(|ap| AccessPointSummary {
                    name: ap.name().to_string(),
                    arn: ap.access_point_arn().map(str::to_string),
                })
                .collect();
            Ok(Page::new(items, token(output.next_token())))
        }
        .boxed()
    }

    fn delete_access_point(&self, account_id: &str, name: &str) -> BoxFuture<'static, Result<()>> {
        let client = self.client.clone();
        let account_id = account_id.to_string();
        let name = name.to_string();
        async move {
            info!(account_id = %account_id, name = %name, "Deleting S3 access point");
            let result = client
                .delete_access_point()
                .account_id(&account_id)
                .name(&name)
                .send()
                .await
                .map_err(|e| from_sdk_error(&e).into());

            finish_delete("access point", &name, result)?;
            Ok(())
        }
        .boxed()
    }

    fn list_multi_region_access_points(
        &self,
        account_id: &str,
        next_token: Option<String>,
    ) -> BoxFuture<'static, Result<Page<MultiRegionAccessPointSummary>>> {
        let client = self.client.clone();
        let account_id = account_id.to_string();
        async move {
            let output = client
                .list_multi_region_access_points()
                .account_id(account_id)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| from_sdk_error(&e))
                .context("Failed to list multi-region access points")?;

            let items = output
                .access_points()
                .iter()
                .map(|ap| MultiRegionAccessPointSummary {
                    name: ap.name().map(str::to_string),
                })
                .collect();
            Ok(Page::new(items, token(output.next_token())))
        }
        .boxed()
    }

    fn delete_multi_region_access_point(
        &self,
        account_id: &str,
        name: &str,
    ) -> BoxFuture<'static, Result<Option<String>>> {
        let client = self.client.clone();
        let account_id = account_id.to_string();
        let name = name.to_string();
        async move {
            info!(account_id = %account_id, name = %name, "Deleting S3 multi-region access point");
            let details = DeleteMultiRegionAccessPointInput::builder()
                .name(&name)
                .build()
                .context("Failed to build multi-region access point delete input")?;

            let result = client
                .delete_multi_region_access_point()
                .account_id(&account_id)
                .client_token(uuid::Uuid::new_v4().to_string())
                .details(details)
                .send()
                .await
                .map_err(|e| from_sdk_error(&e).into());

            match finish_delete("multi-region access point", &name, result)? {
                Some(output) => Ok(Some(
                    output
                        .request_token_arn()
                        .context("No request token returned for multi-region access point delete")?
                        .to_string(),
                )),
                None => Ok(None),
            }
        }
        .boxed()
    }

    fn describe_multi_region_access_point_operation(
        &self,
        account_id: &str,
        request_token: &str,
    ) -> BoxFuture<'static, Result<AsyncOperationStatus>> {
        let client = self.client.clone();
        let account_id = account_id.to_string();
        let request_token = request_token.to_string();
        async move {
            let output = client
                .describe_multi_region_access_point_operation()
                .account_id(account_id)
                .request_token_arn(request_token)
                .send()
                .await
                .map_err(|e| from_sdk_error(&e))
                .context("Failed to describe multi-region access point operation")?;

            let operation = output
                .async_operation()
                .context("No async operation in describe response")?;
            let status = operation.request_status().unwrap_or_default();
            let detail = operation
                .response_details()
                .and_then(|d| d.error_details())
                .map(|e| {
                    format!(
                        "{}: {}",
                        e.code().unwrap_or("UnknownError"),
                        e.message().unwrap_or("no message")
                    )
                });
            Ok(AsyncOperationStatus::from_request_status(status, detail))
        }
        .boxed()
    }

    fn list_object_lambda_access_points(
        &self,
        account_id: &str,
        next_token: Option<String>,
    ) -> BoxFuture<'static, Result<Page<ObjectLambdaAccessPointSummary>>> {
        let client = self.client.clone();
        let account_id = account_id.to_string();
        async move {
            let output = client
                .list_access_points_for_object_lambda()
                .account_id(account_id)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| from_sdk_error(&e))
                .context("Failed to list object lambda access points")?;

            let items = output
                .object_lambda_access_point_list()
                .iter()
                .map(|ap| ObjectLambdaAccessPointSummary {
                    name: ap.name().to_string(),
                })
                .collect();
            Ok(Page::new(items, token(output.next_token())))
        }
        .boxed()
    }

    fn delete_object_lambda_access_point(
        &self,
        account_id: &str,
        name: &str,
    ) -> BoxFuture<'static, Result<()>> {
        let client = self.client.clone();
        let account_id = account_id.to_string();
        let name = name.to_string();
        async move {
            info!(account_id = %account_id, name = %name, "Deleting S3 object lambda access point");
            let result = client
                .delete_access_point_for_object_lambda()
                .account_id(&account_id)
                .name(&name)
                .send()
                .await
                .map_err(|e| from_sdk_error(&e).into());

            finish_delete("object lambda access point", &name, result)?;
            Ok(())
        }
        .boxed()
    }

    fn list_storage_lens_configurations(
        &self,
        account_id: &str,
        next_token: Option<String>,
    ) -> BoxFuture<'static, Result<Page<StorageLensConfigurationSummary>>> {
        let client = self.client.clone();
        let account_id = account_id.to_string();
        async move {
            let output = client
                .list_storage_lens_configurations()
                .account_id(account_id)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| from_sdk_error(&e))
                .context("Failed to list storage lens configurations")?;

            let items = output
                .storage_lens_configuration_list()
                .iter()
                .map(|c| StorageLensConfigurationSummary {
                    id: c.id().to_string(),
                })
                .collect();
            Ok(Page::new(items, token(output.next_token())))
        }
        .boxed()
    }

    fn delete_storage_lens_configuration(
        &self,
        account_id: &str,
        config_id: &str,
    ) -> BoxFuture<'static, Result<()>> {
        let client = self.client.clone();
        let account_id = account_id.to_string();
        let config_id = config_id.to_string();
        async move {
            info!(account_id = %account_id, config_id = %config_id, "Deleting S3 storage lens configuration");
            let result = client
                .delete_storage_lens_configuration()
                .account_id(&account_id)
                .config_id(&config_id)
                .send()
                .await
                .map_err(|e| from_sdk_error(&e).into());

            finish_delete("storage lens configuration", &config_id, result)?;
            Ok(())
        }
        .boxed()
    }
}
