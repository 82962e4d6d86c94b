//! acc-sweep - Leftover acceptance-test resource sweeper
//!
//! Finds resources that acceptance tests left behind in an AWS account and
//! deletes them, region by region, in dependency order.
//!
//! - [`sweep`]: the resource-agnostic engine (registry, discovery, deletion)
//! - [`sweepers`]: the concrete resource kinds
//! - [`aws`]: AWS SDK plumbing

pub mod aws;
pub mod config;
pub mod sweep;
pub mod sweepers;
pub mod wait;
