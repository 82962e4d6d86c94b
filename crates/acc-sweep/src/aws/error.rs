//! AWS error classification and handling
//!
//! SDK errors are converted at the client boundary into a typed [`AwsError`]
//! using the `.code()` / `.message()` metadata instead of string matching on
//! the Debug format. Callers further up classify an `anyhow::Error` by
//! walking its chain for that typed error.

use anyhow::Result;
use aws_sdk_s3control::error::{DisplayErrorContext, ProvideErrorMetadata};
use thiserror::Error;

/// AWS error categories for retry, skip and cleanup logic
#[derive(Debug, Clone, Error)]
pub enum AwsError {
    /// Resource was not found (already deleted; success for a sweep)
    #[error("Resource not found: {message}")]
    NotFound { code: String, message: String },

    /// Rate limit exceeded (retryable with backoff)
    #[error("Rate limit exceeded: {message}")]
    Throttled { message: String },

    /// Resource is busy or still has dependent objects (retryable)
    #[error("Resource is busy or has dependent objects: {message}")]
    Conflict { message: String },

    /// Access denied to the operation
    #[error("Access denied ({code}): {message}")]
    AccessDenied { code: String, message: String },

    /// The operation does not exist for this account, region or partition
    #[error("Operation not supported here ({code}): {message}")]
    Unsupported { code: String, message: String },

    /// Generic AWS SDK error with code and message
    #[error("AWS error{}: {message}", .code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default())]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, AwsError::Throttled { .. } | AwsError::Conflict { .. })
    }

    /// Check if the error means the API is structurally unavailable to this
    /// account or region (feature disabled, opt-in missing, no endpoint).
    ///
    /// An unclassified error still counts when its message names a region
    /// gap or a missing endpoint.
    pub fn is_unsupported(&self) -> bool {
        match self {
            AwsError::AccessDenied { .. } | AwsError::Unsupported { .. } => true,
            AwsError::Sdk { message, .. } => has_unsupported_message(message),
            _ => false,
        }
    }

    /// The AWS error code, if the service returned one
    pub fn code(&self) -> Option<&str> {
        match self {
            AwsError::NotFound { code, .. }
            | AwsError::AccessDenied { code, .. }
            | AwsError::Unsupported { code, .. } => Some(code),
            AwsError::Sdk { code, .. } => code.as_deref(),
            AwsError::Throttled { .. } | AwsError::Conflict { .. } => None,
        }
    }

    /// Get a user-friendly suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            AwsError::Throttled { .. } => suggestion_for_code("Throttling"),
            other => other.code().and_then(suggestion_for_code),
        }
    }
}

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    "NoSuchAccessPoint",
    "NoSuchAccessPointForObjectLambda",
    "NoSuchMultiRegionAccessPoint",
    "NoSuchConfiguration",
    "NoSuchPublicAccessBlockConfiguration",
    "NoSuchBucket",
    "NotFound",
    "ResourceNotFoundException",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "SlowDown",
    "TooManyRequestsException",
];

/// Known AWS error codes for busy or still-referenced resources
const CONFLICT_CODES: &[&str] = &["DependencyViolation", "OperationAborted", "ConflictException"];

/// Known AWS error codes for denied access
const ACCESS_DENIED_CODES: &[&str] = &["AccessDenied", "AccessDeniedException"];

/// Known AWS error codes for operations that do not exist for this account/region
const UNSUPPORTED_CODES: &[&str] = &[
    "UnsupportedOperation",
    "UnknownOperationException",
    "UnrecognizedClientException",
    "OptInRequired",
    "SubscriptionRequiredException",
    "InvalidAction",
    "InvalidInputException",
];

/// Message fragments that mark an operation as unavailable in a region,
/// whatever code the service attaches to them.
const UNSUPPORTED_MESSAGES: &[&str] = &[
    "is not supported in this region",
    "not available in this region",
    "Unknown operation",
    "dns error",
    "failed to lookup address",
];

fn has_unsupported_message(message: &str) -> bool {
    UNSUPPORTED_MESSAGES.iter().any(|m| message.contains(m))
}

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();
    let unsupported_message = has_unsupported_message(&message);

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound {
            code: c.to_string(),
            message,
        },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled { message },
        Some(c) if CONFLICT_CODES.contains(&c) => AwsError::Conflict { message },
        Some(c) if ACCESS_DENIED_CODES.contains(&c) => AwsError::AccessDenied {
            code: c.to_string(),
            message,
        },
        // These two codes are also used for ordinary bad requests; only the
        // "operation does not exist" flavour is a region gap.
        Some(c @ ("InvalidAction" | "InvalidInputException")) => {
            if message.contains("is not supported") || message.contains("Unknown operation") {
                AwsError::Unsupported {
                    code: c.to_string(),
                    message,
                }
            } else {
                AwsError::Sdk {
                    code: Some(c.to_string()),
                    message,
                }
            }
        }
        Some(c) if UNSUPPORTED_CODES.contains(&c) => AwsError::Unsupported {
            code: c.to_string(),
            message,
        },
        _ if unsupported_message => AwsError::Unsupported {
            code: code.unwrap_or("Unsupported").to_string(),
            message,
        },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Convert an SDK error (any operation) into a classified [`AwsError`].
///
/// Transport-level failures carry no code or message, so the full error
/// context is used as the message to keep DNS/timeout details visible.
pub fn from_sdk_error<E>(err: &E) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let context = DisplayErrorContext(err).to_string();
    classify_aws_error(err.code(), Some(err.message().unwrap_or(&context)))
}

/// Classify an error from an anyhow::Error.
///
/// Walks the error chain looking for an [`AwsError`] attached at the client
/// boundary. Falls back to extracting a known code from the Debug
/// representation if no typed error is found.
pub fn classify_anyhow_error(error: &anyhow::Error) -> AwsError {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<AwsError>() {
            return e.clone();
        }
    }

    // Fallback: extract error code from debug string representation
    let debug_str = format!("{:?}", error);
    if let Some(code) = extract_error_code(&debug_str) {
        return classify_aws_error(Some(&code), Some(&debug_str));
    }

    classify_aws_error(None, Some(&format!("{:#}", error)))
}

/// Turn a "not found" failure into `Ok(None)`.
///
/// Deletes use this so that removing an already-removed resource is a
/// success, which makes every sweep deletion idempotent.
pub fn ignore_not_found<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if classify_anyhow_error(&e).is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// All known AWS error codes for extraction from debug strings (flat list)
const ALL_KNOWN_CODES: &[&[&str]] = &[
    NOT_FOUND_CODES,
    THROTTLING_CODES,
    CONFLICT_CODES,
    ACCESS_DENIED_CODES,
    UNSUPPORTED_CODES,
];

/// Extract an AWS error code from a debug string representation
fn extract_error_code(debug_str: &str) -> Option<String> {
    // Prefer an explicit `code: Some("...")` field over substring matches,
    // since e.g. "AccessDenied" is a prefix of "AccessDeniedException".
    if let Some(start) = debug_str.find("code: Some(\"") {
        let rest = &debug_str[start + 12..];
        if let Some(end) = rest.find('"') {
            return Some(rest[..end].to_string());
        }
    }

    // Longest match wins for the same reason
    ALL_KNOWN_CODES
        .iter()
        .flat_map(|codes| codes.iter())
        .filter(|code| debug_str.contains(**code))
        .max_by_key(|code| code.len())
        .map(|code| (*code).to_string())
}

/// Error code to user-friendly suggestion mapping
const SUGGESTIONS: &[(&str, &str)] = &[
    (
        "AccessDenied",
        "Check that the sweeper credentials may list and delete this resource type.",
    ),
    (
        "AccessDeniedException",
        "Check that the sweeper credentials may list and delete this resource type.",
    ),
    (
        "ExpiredToken",
        "AWS credentials have expired. Refresh them and re-run the sweep.",
    ),
    (
        "InvalidClientTokenId",
        "AWS credentials are not valid for this partition. Check --profile and --region.",
    ),
    (
        "Throttling",
        "AWS API rate limit hit. Lower --concurrency or re-run the sweep later.",
    ),
    (
        "ConflictException",
        "The resource is being modified by another operation. Re-run the sweep later.",
    ),
];

/// Get a user-friendly suggestion for a known error code.
fn suggestion_for_code(code: &str) -> Option<String> {
    SUGGESTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| (*s).to_string())
}
