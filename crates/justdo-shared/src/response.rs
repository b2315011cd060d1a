//! Standardized API error body.

use serde::{Deserialize, Serialize};

/// Error body returned for every failed request: `{"error": ..., "message": ...}`.
///
/// `error` is the short category (the HTTP reason phrase), `message` the
/// human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }

    // Common error constructors
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("Bad Request", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("Unauthorized", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("Not Found", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("Conflict", message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new("Payload Too Large", message)
    }

    pub fn internal_error() -> Self {
        Self::new("Internal Server Error", "an unexpected error occurred")
    }
}
