//! S3 Control sweepers
//!
//! Access points, Multi-Region Access Points, Object Lambda Access Points
//! and Storage Lens configurations. All four are account-scoped S3 Control
//! resources; every listing and delete call takes the account id.

mod access_point;
mod multi_region_access_point;
mod object_lambda_access_point;
mod storage_lens;

pub use access_point::AccessPointSweeper;
pub use multi_region_access_point::MultiRegionAccessPointSweeper;
pub use object_lambda_access_point::ObjectLambdaAccessPointSweeper;
pub use storage_lens::StorageLensConfigurationSweeper;

use crate::aws::SharedRegionalClient;
use crate::sweep::{KindSweeper, RegistryError, SweepContext, SweepRegistry, sweep_kind};
use acc_sweep_common::regions::{GOV_CLOUD_REGIONS, US_WEST_2};
use acc_sweep_common::{RegionPolicy, ResourceKind};
use std::sync::Arc;

pub const ACCESS_POINT: ResourceKind =
    ResourceKind::new("aws_s3_access_point", "S3 Access Point", RegionPolicy::Always);

/// The control plane for Multi-Region Access Points lives in us-west-2, so
/// they are listed from there only.
pub const MULTI_REGION_ACCESS_POINT: ResourceKind = ResourceKind::new(
    "aws_s3control_multi_region_access_point",
    "S3 Multi-Region Access Point",
    RegionPolicy::Only(&[US_WEST_2]),
);

pub const OBJECT_LAMBDA_ACCESS_POINT: ResourceKind = ResourceKind::new(
    "aws_s3control_object_lambda_access_point",
    "S3 Object Lambda Access Point",
    RegionPolicy::Always,
);

pub const STORAGE_LENS_CONFIGURATION: ResourceKind = ResourceKind::new(
    "aws_s3control_storage_lens_configuration",
    "S3 Storage Lens Configuration",
    RegionPolicy::Except(GOV_CLOUD_REGIONS),
);

/// Register every S3 Control sweeper.
pub fn register(registry: &mut SweepRegistry) -> Result<(), RegistryError> {
    // An access point cannot be deleted while an Object Lambda Access Point
    // still points at it.
    register_kind(
        registry,
        AccessPointSweeper,
        &[OBJECT_LAMBDA_ACCESS_POINT.name],
    )?;
    register_kind(registry, MultiRegionAccessPointSweeper::default(), &[])?;
    register_kind(registry, ObjectLambdaAccessPointSweeper, &[])?;
    register_kind(registry, StorageLensConfigurationSweeper, &[])?;
    Ok(())
}

fn register_kind<S>(
    registry: &mut SweepRegistry,
    sweeper: S,
    dependencies: &[&str],
) -> Result<(), RegistryError>
where
    S: KindSweeper<Client = Arc<SharedRegionalClient>> + 'static,
{
    let name = sweeper.kind().name;
    let sweeper = Arc::new(sweeper);
    registry.register(name, dependencies, move |ctx: Arc<SweepContext>| {
        let sweeper = sweeper.clone();
        async move { sweep_kind(&ctx, sweeper.as_ref(), || ctx.clients().get()).await }
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::aws::s3control::MockS3ControlOperations;
    use crate::aws::{AccountId, RegionalClients, SharedRegionalClient};
    use crate::sweep::{OrchestratorConfig, SweepContext, SweepOrchestrator};
    use std::sync::Arc;
    use std::time::Duration;

    pub const ACCOUNT: &str = "123456789012";

    pub fn client(region: &str, mock: MockS3ControlOperations) -> Arc<SharedRegionalClient> {
        Arc::new(SharedRegionalClient::new(
            region,
            AccountId::new(ACCOUNT),
            Arc::new(mock),
        ))
    }

    pub fn context(region: &str) -> SweepContext {
        SweepContext::new(
            region,
            SweepOrchestrator::new(OrchestratorConfig {
                min_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
                ..OrchestratorConfig::default()
            }),
            Arc::new(RegionalClients::new(region, None)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_all_kinds_with_dependencies() {
        let mut registry = SweepRegistry::new();
        register(&mut registry).unwrap();

        assert_eq!(registry.len(), 4);
        let access_point = registry.get(ACCESS_POINT.name).unwrap();
        assert_eq!(
            access_point.dependencies(),
            [OBJECT_LAMBDA_ACCESS_POINT.name.to_string()]
        );

        let order: Vec<&str> = registry
            .execution_order()
            .unwrap()
            .into_iter()
            .map(|e| e.name())
            .collect();
        let pos = |name: &str| order.iter().position(|n| *n == name).unwrap();
        assert!(pos(OBJECT_LAMBDA_ACCESS_POINT.name) < pos(ACCESS_POINT.name));
    }

    #[test]
    fn region_policies() {
        assert!(MULTI_REGION_ACCESS_POINT.is_eligible("us-west-2"));
        assert!(!MULTI_REGION_ACCESS_POINT.is_eligible("us-east-1"));
        assert!(STORAGE_LENS_CONFIGURATION.is_eligible("us-east-1"));
        assert!(!STORAGE_LENS_CONFIGURATION.is_eligible("us-gov-west-1"));
        assert!(!STORAGE_LENS_CONFIGURATION.is_eligible("us-gov-east-1"));
        assert!(ACCESS_POINT.is_eligible("us-gov-east-1"));
    }

    #[test]
    fn registering_twice_fails() {
        let mut registry = SweepRegistry::new();
        register(&mut registry).unwrap();
        assert!(matches!(
            register(&mut registry),
            Err(RegistryError::Duplicate(_))
        ));
    }
}
