//! Shared test utilities for acc-sweep
//!
//! This crate provides common test helpers that can be used across
//! multiple test modules without circular dependencies.
//!
//! ## Modules
//!
//! - [`aws`]: AWS region detection and unique test names
//! - [`call_log`]: Ordered call recording for fake backends

pub mod aws;
pub mod call_log;

// Re-export commonly used items
pub use aws::{get_test_region, test_resource_name, test_run_id};
pub use call_log::CallLog;
