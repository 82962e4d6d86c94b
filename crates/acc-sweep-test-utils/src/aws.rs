//! Helpers for the live AWS tests
//!
//! Live tests never create anything they do not delete; names built here
//! carry [`TEST_NAME_PREFIX`] so a sweep of a test account can spot leftovers.

use chrono::Utc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Prefix for every resource name generated by live tests
pub const TEST_NAME_PREFIX: &str = "acc-sweep-test";

/// Region the live tests run against.
///
/// The first entry of `SWEEP_REGIONS` wins, so the tests hit the same region
/// the CLI would sweep first. Otherwise `AWS_REGION`, then
/// `AWS_DEFAULT_REGION`, then `us-west-2` (the only region where every
/// S3 Control kind is listed).
///
/// ```
/// let region = acc_sweep_test_utils::get_test_region();
/// assert!(!region.contains(','));
/// ```
pub fn get_test_region() -> String {
    let from_sweep_list = std::env::var("SWEEP_REGIONS").ok().and_then(|list| {
        list.split(',')
            .map(str::trim)
            .find(|r| !r.is_empty())
            .map(str::to_string)
    });

    from_sweep_list
        .or_else(|| std::env::var("AWS_REGION").ok())
        .or_else(|| std::env::var("AWS_DEFAULT_REGION").ok())
        .unwrap_or_else(|| "us-west-2".to_string())
}

/// `test-<unix millis>-<counter>`, unique within and across test processes
pub fn test_run_id() -> String {
    static SEQUENCE: AtomicU32 = AtomicU32::new(0);
    format!(
        "test-{}-{}",
        Utc::now().timestamp_millis(),
        SEQUENCE.fetch_add(1, Ordering::Relaxed)
    )
}

/// Name usable for any S3 Control resource: lowercase letters, digits and
/// hyphens only, never containing the `:` id separator.
///
/// ```
/// let name = acc_sweep_test_utils::test_resource_name();
/// assert!(name.starts_with("acc-sweep-test-"));
/// assert!(!name.contains(':'));
/// ```
pub fn test_resource_name() -> String {
    let run_id = test_run_id();
    let suffix = run_id.strip_prefix("test-").unwrap_or(&run_id);
    format!("{TEST_NAME_PREFIX}-{suffix}")
}
