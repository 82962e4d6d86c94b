//! AWS region identifiers used by sweeper eligibility rules
//!
//! Only the regions that some resource kind singles out are listed here;
//! every other region is handled generically.
//!
//! | Constant | Region | Partition |
//! |----------|--------|-----------|
//! | [`US_EAST_1`] | `us-east-1` | `aws` |
//! | [`US_WEST_2`] | `us-west-2` | `aws` |
//! | [`US_GOV_EAST_1`] | `us-gov-east-1` | `aws-us-gov` |
//! | [`US_GOV_WEST_1`] | `us-gov-west-1` | `aws-us-gov` |

pub const US_EAST_1: &str = "us-east-1";

pub const US_WEST_2: &str = "us-west-2";

pub const US_GOV_EAST_1: &str = "us-gov-east-1";

pub const US_GOV_WEST_1: &str = "us-gov-west-1";

/// GovCloud regions, excluded by kinds that are not offered there
pub const GOV_CLOUD_REGIONS: &[&str] = &[US_GOV_EAST_1, US_GOV_WEST_1];

/// Partition that owns a region
pub fn partition_for_region(region: &str) -> &'static str {
    if region.starts_with("us-gov-") {
        "aws-us-gov"
    } else if region.starts_with("cn-") {
        "aws-cn"
    } else if region.starts_with("us-isob-") {
        "aws-iso-b"
    } else if region.starts_with("us-iso-") {
        "aws-iso"
    } else {
        "aws"
    }
}

/// Split a comma-separated region list, dropping blanks and duplicates while
/// keeping the first-seen order.
pub fn parse_region_list(s: &str) -> Vec<String> {
    let mut regions: Vec<String> = Vec::new();
    for region in s.split(',').map(str::trim).filter(|r| !r.is_empty()) {
        if !regions.iter().any(|r| r == region) {
            regions.push(region.to_string());
        }
    }
    regions
}
