//! Error types for Redmine API operations.

use thiserror::Error;

/// Errors that can occur during Redmine API operations.
#[derive(Debug, Error)]
pub enum RedmineError {
    /// Configuration is missing or incomplete.
    #[error("Redmine configuration required: {0}")]
    ConfigMissing(String),

    /// Resource not found on the server.
    #[error("{resource} '{key}' not found")]
    NotFound {
        resource: &'static str,
        key: String,
    },

    /// API request failed with a non-2xx status not otherwise classified.
    #[error("Redmine API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body is not valid JSON or does not have the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Server rejected a write with field-level complaints (HTTP 422).
    #[error("Validation failed: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    /// Resource type is not available for the configured server version.
    #[error("'{resource}' is not available on server version {configured}")]
    Unsupported {
        resource: &'static str,
        configured: String,
    },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias for Redmine operations.
pub type Result<T> = core::result::Result<T, RedmineError>;
