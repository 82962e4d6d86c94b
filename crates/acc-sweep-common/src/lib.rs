//! acc-sweep-common - Shared types for the sweeper
//!
//! This crate holds the pieces of the sweeper that do not talk to AWS,
//! without any AWS SDK dependencies to keep it lightweight.
//!
//! ## Modules
//!
//! - [`arn`]: Minimal ARN parsing
//! - [`identifier`]: Resource identifier codecs (natural key ⇄ opaque id)
//! - [`regions`]: Region constants and helpers
//! - [`resource_kind`]: Resource kind descriptors and region eligibility

pub mod arn;
pub mod identifier;
pub mod regions;
pub mod resource_kind;

// Re-export commonly used types
pub use arn::{Arn, ArnError};
pub use identifier::{AccessPointId, AccountScopedId, IdError};
pub use resource_kind::{RegionPolicy, ResourceKind};
