//! AWS backend for the sweepers
//!
//! - [`context`]: SDK configuration loaded once per region
//! - [`account`]: STS account lookup
//! - [`error`]: SDK error classification
//! - [`s3control`]: S3 Control listing and deletion
//! - [`client`]: The per-region client shared by all sweepers

pub mod account;
pub mod client;
pub mod context;
pub mod error;
pub mod s3control;

pub use account::{AccountId, get_current_account_id};
pub use client::{RegionalClients, SharedRegionalClient};
pub use context::{AwsContext, FromAwsContext};
pub use error::{AwsError, classify_anyhow_error, classify_aws_error, ignore_not_found};
pub use s3control::{Page, S3ControlClient, S3ControlOperations};
