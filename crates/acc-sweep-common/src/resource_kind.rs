//! Resource kind descriptors and region eligibility
//!
//! Every sweepable resource kind declares a stable name (the registry key),
//! a human-readable name used in logs and error context, and the regions in
//! which it can be discovered at all.

/// Where a resource kind can be listed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionPolicy {
    /// Discoverable in every region
    Always,
    /// Only discoverable in the listed regions (e.g. global control planes)
    Only(&'static [&'static str]),
    /// Discoverable everywhere except the listed regions
    Except(&'static [&'static str]),
}

impl RegionPolicy {
    /// Whether the kind can be listed in `region`.
    pub fn is_eligible(&self, region: &str) -> bool {
        match self {
            RegionPolicy::Always => true,
            RegionPolicy::Only(regions) => regions.contains(&region),
            RegionPolicy::Except(regions) => !regions.contains(&region),
        }
    }
}

/// Static description of one sweepable resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceKind {
    /// Unique registry key, e.g. `aws_s3_access_point`
    pub name: &'static str,
    /// Used in logs and error context, e.g. `S3 Access Point`
    pub display_name: &'static str,
    pub region_policy: RegionPolicy,
}

impl ResourceKind {
    pub const fn new(
        name: &'static str,
        display_name: &'static str,
        region_policy: RegionPolicy,
    ) -> Self {
        Self {
            name,
            display_name,
            region_policy,
        }
    }

    pub fn is_eligible(&self, region: &str) -> bool {
        self.region_policy.is_eligible(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::{GOV_CLOUD_REGIONS, US_EAST_1, US_GOV_EAST_1, US_GOV_WEST_1, US_WEST_2};

    #[test]
    fn always_eligible() {
        for region in [US_EAST_1, US_WEST_2, US_GOV_WEST_1] {
            assert!(RegionPolicy::Always.is_eligible(region));
        }
    }

    #[test]
    fn only_policy() {
        let policy = RegionPolicy::Only(&[US_WEST_2]);
        assert!(policy.is_eligible(US_WEST_2));
        assert!(!policy.is_eligible(US_EAST_1));
        assert!(!policy.is_eligible(""));
    }

    #[test]
    fn except_policy() {
        let policy = RegionPolicy::Except(GOV_CLOUD_REGIONS);
        assert!(policy.is_eligible(US_EAST_1));
        assert!(!policy.is_eligible(US_GOV_EAST_1));
        assert!(!policy.is_eligible(US_GOV_WEST_1));
    }

    #[test]
    fn kind_delegates_to_policy() {
        const KIND: ResourceKind =
            ResourceKind::new("aws_test_thing", "Test Thing", RegionPolicy::Only(&[US_WEST_2]));
        assert!(KIND.is_eligible(US_WEST_2));
        assert!(!KIND.is_eligible(US_EAST_1));
    }
}
