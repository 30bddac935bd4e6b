//! Error types for the customer API client.
//!
//! # Design
//! Every failure a call can end in surfaces through this one enum, so callers
//! that only want to show the operator a message can `to_string()` it, while
//! callers that care about the cause can match on the variant. The `Display`
//! text is the operator-facing message: application-level rejections
//! (`success: false`) are shown verbatim, everything that went wrong on the
//! wire carries the `API Error: ` marker.

use thiserror::Error;

/// Generic text used whenever a response body is not the JSON we expect.
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid JSON response from server";

/// Errors produced while building requests or resolving responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered `success: false`; `message` is its text, unmodified.
    #[error("{message}")]
    Rejected { message: String },

    /// A 2xx body could not be decoded as JSON.
    #[error("{}", INVALID_RESPONSE_MESSAGE)]
    InvalidResponse,

    /// The server returned a non-2xx status.
    #[error("API Error: HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// No HTTP response was received (DNS, TLS, refused connection, refused redirect).
    #[error("API Error: {message}")]
    Transport { message: String },

    /// The request exceeded the configured transfer timeout and was aborted.
    #[error("API Error: request timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    /// A completed response matched no entry of the route table.
    #[error("no response handler for {method} {endpoint}")]
    Unrouted { method: String, endpoint: String },

    /// A customer id that is zero or negative was passed where a stored
    /// record is required.
    #[error("customer id must be a positive integer, got {0}")]
    InvalidId(i64),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The HTTP client could not be constructed or its task died.
    #[error("API Error: {0}")]
    Client(String),
}
