//! Listing error classification
//!
//! A listing failure either means the API does not exist for this account
//! or region (skip the kind, nothing to clean) or that something actually
//! went wrong (fatal for the kind).

use crate::aws::classify_anyhow_error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingErrorClass {
    /// The kind cannot exist here; stop paging without recording an error.
    Skip,
    /// Record the error against the kind.
    Fatal,
}

pub fn classify_listing_error(error: &anyhow::Error) -> ListingErrorClass {
    if classify_anyhow_error(error).is_unsupported() {
        ListingErrorClass::Skip
    } else {
        ListingErrorClass::Fatal
    }
}
