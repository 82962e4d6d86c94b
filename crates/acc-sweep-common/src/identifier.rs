//! Resource identifier codecs
//!
//! A resource's natural key (account id plus a name, or a full ARN) is stored
//! in a `Sweepable` as a single opaque string. The codecs here turn the key
//! into that string and back, and guarantee `decode(encode(x)) == x`: a
//! component that is empty or contains the separator is rejected at encode
//! time instead of producing an ambiguous id.

use crate::arn::{Arn, ArnError};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between identifier components
pub const ID_SEPARATOR: char = ':';

/// Identifier encode/decode failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("identifier component {index} is empty")]
    EmptyComponent { index: usize },

    #[error("identifier component '{component}' contains the separator ':'")]
    SeparatorInComponent { component: String },

    #[error("unexpected format for ID ({id}), expected {expected}")]
    UnexpectedFormat { id: String, expected: &'static str },

    #[error("unsupported {what} ARN ({arn}) service: {service}")]
    UnsupportedService {
        what: &'static str,
        arn: String,
        service: String,
    },

    #[error(transparent)]
    Arn(#[from] ArnError),
}

/// Join components with [`ID_SEPARATOR`].
pub fn encode_id(parts: &[&str]) -> Result<String, IdError> {
    for (index, part) in parts.iter().enumerate() {
        if part.is_empty() {
            return Err(IdError::EmptyComponent { index });
        }
        if part.contains(ID_SEPARATOR) {
            return Err(IdError::SeparatorInComponent {
                component: (*part).to_string(),
            });
        }
    }
    Ok(parts.join(&ID_SEPARATOR.to_string()))
}

/// Split an id produced by [`encode_id`] into exactly `N` non-empty components.
pub fn decode_id<const N: usize>(id: &str, expected: &'static str) -> Result<[String; N], IdError> {
    let unexpected = || IdError::UnexpectedFormat {
        id: id.to_string(),
        expected,
    };

    let parts: Vec<String> = id.split(ID_SEPARATOR).map(str::to_string).collect();
    if parts.iter().any(String::is_empty) {
        return Err(unexpected());
    }
    parts.try_into().map_err(|_| unexpected())
}

/// Natural key of an account-scoped resource: `account_id:name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountScopedId {
    pub account_id: String,
    pub name: String,
}

impl AccountScopedId {
    const EXPECTED: &'static str = "ACCOUNT-ID:NAME";

    pub fn new(account_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            name: name.into(),
        }
    }

    pub fn encode(&self) -> Result<String, IdError> {
        encode_id(&[&self.account_id, &self.name])
    }
}

impl FromStr for AccountScopedId {
    type Err = IdError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let [account_id, name] = decode_id::<2>(id, Self::EXPECTED)?;
        Ok(Self { account_id, name })
    }
}

impl fmt::Display for AccountScopedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.account_id, ID_SEPARATOR, self.name)
    }
}

/// Natural key of an S3 access point.
///
/// Regular access points are keyed by account and name. Access points on
/// S3 on Outposts are keyed by their full ARN, which the delete call takes in
/// place of the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccessPointId {
    Account(AccountScopedId),
    Outposts(Arn),
}

impl AccessPointId {
    /// Derive the id from the ARN returned by a listing call.
    pub fn from_arn(access_point_arn: &str) -> Result<Self, IdError> {
        let arn: Arn = access_point_arn.parse()?;

        match arn.service.as_str() {
            "s3" => {
                let name = arn
                    .resource
                    .strip_prefix("accesspoint/")
                    .ok_or_else(|| IdError::UnexpectedFormat {
                        id: access_point_arn.to_string(),
                        expected: "accesspoint/NAME resource",
                    })?;
                Ok(Self::Account(AccountScopedId::new(arn.account_id.clone(), name)))
            }
            "s3-outposts" => Ok(Self::Outposts(arn)),
            service => Err(IdError::UnsupportedService {
                what: "S3 Access Point",
                arn: access_point_arn.to_string(),
                service: service.to_string(),
            }),
        }
    }

    pub fn encode(&self) -> Result<String, IdError> {
        match self {
            Self::Account(id) => id.encode(),
            Self::Outposts(arn) => Ok(arn.to_string()),
        }
    }

    /// Account that owns the access point
    pub fn account_id(&self) -> &str {
        match self {
            Self::Account(id) => &id.account_id,
            Self::Outposts(arn) => &arn.account_id,
        }
    }

    /// Value passed as the access point name to the delete call
    pub fn delete_name(&self) -> String {
        match self {
            Self::Account(id) => id.name.clone(),
            Self::Outposts(arn) => arn.to_string(),
        }
    }
}

impl FromStr for AccessPointId {
    type Err = IdError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        if !Arn::is_arn(id) {
            return Ok(Self::Account(id.parse()?));
        }
        // Only Outposts ids are ARNs; an s3 ARN never comes out of `encode`
        let arn: Arn = id.parse()?;
        if arn.service != "s3-outposts" {
            return Err(IdError::UnsupportedService {
                what: "S3 on Outposts Access Point",
                arn: id.to_string(),
                service: arn.service,
            });
        }
        Ok(Self::Outposts(arn))
    }
}
