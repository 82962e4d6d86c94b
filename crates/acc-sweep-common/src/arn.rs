//! Minimal Amazon Resource Name parsing
//!
//! Only what the identifier codecs need: split an ARN into its six fields
//! and put it back together unchanged.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// ARN parse failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArnError {
    #[error("'{0}' is not an ARN: missing 'arn:' prefix")]
    MissingPrefix(String),

    #[error("ARN '{0}' has too few sections, expected arn:partition:service:region:account:resource")]
    TooFewSections(String),

    #[error("ARN '{arn}' has an empty {field}")]
    EmptyField { arn: String, field: &'static str },
}

/// Parsed ARN. Region and account may legitimately be empty (e.g. IAM, S3 buckets).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account_id: String,
    pub resource: String,
}

impl Arn {
    /// Quick syntactic check, mirrors what callers use to decide between an
    /// ARN-shaped id and a delimited id.
    pub fn is_arn(s: &str) -> bool {
        s.starts_with("arn:") && s.split(':').count() >= 6
    }
}

impl FromStr for Arn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("arn:")
            .ok_or_else(|| ArnError::MissingPrefix(s.to_string()))?;

        // The resource section may itself contain ':'
        let sections: Vec<&str> = rest.splitn(5, ':').collect();
        let [partition, service, region, account_id, resource] = sections[..] else {
            return Err(ArnError::TooFewSections(s.to_string()));
        };

        for (field, value) in [
            ("partition", partition),
            ("service", service),
            ("resource", resource),
        ] {
            if value.is_empty() {
                return Err(ArnError::EmptyField {
                    arn: s.to_string(),
                    field,
                });
            }
        }

        Ok(Self {
            partition: partition.to_string(),
            service: service.to_string(),
            region: region.to_string(),
            account_id: account_id.to_string(),
            resource: resource.to_string(),
        })
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_access_point_arn() {
        let arn: Arn = "arn:aws:s3:us-west-2:123456789012:accesspoint/my-ap"
            .parse()
            .unwrap();
        assert_eq!(arn.partition, "aws");
        assert_eq!(arn.service, "s3");
        assert_eq!(arn.region, "us-west-2");
        assert_eq!(arn.account_id, "123456789012");
        assert_eq!(arn.resource, "accesspoint/my-ap");
    }

    #[test]
    fn resource_keeps_colons() {
        let s = "arn:aws:s3-outposts:us-west-2:123456789012:outpost/op-01/accesspoint/ap:extra";
        let arn: Arn = s.parse().unwrap();
        assert_eq!(arn.resource, "outpost/op-01/accesspoint/ap:extra");
        assert_eq!(arn.to_string(), s);
    }

    #[test]
    fn empty_region_and_account_allowed() {
        let arn: Arn = "arn:aws:s3:::my-bucket".parse().unwrap();
        assert!(arn.region.is_empty());
        assert!(arn.account_id.is_empty());
        assert_eq!(arn.resource, "my-bucket");
    }

    #[test]
    fn rejects_malformed() {
        assert!(matches!(
            "123456789012:my-ap".parse::<Arn>(),
            Err(ArnError::MissingPrefix(_))
        ));
        assert!(matches!(
            "arn:aws:s3:us-west-2".parse::<Arn>(),
            Err(ArnError::TooFewSections(_))
        ));
        assert!(matches!(
            "arn:aws::us-west-2:123456789012:x".parse::<Arn>(),
            Err(ArnError::EmptyField { field: "service", .. })
        ));
    }

    #[test]
    fn is_arn_check() {
        assert!(Arn::is_arn("arn:aws:s3:us-west-2:123456789012:accesspoint/a"));
        assert!(!Arn::is_arn("123456789012:a"));
        assert!(!Arn::is_arn("arn:aws:s3"));
    }
}
