//! Error types for the SEO audit core.
//!
//! Most conditions an audit runs into are data conditions, not errors: bad
//! markup, unparsable JSON-LD and failed network probes all degrade to
//! absent signals. What remains here is what a caller can actually act on:
//! - `AuditError`: configuration, URL and client construction failures
//! - `Result<T>`: Type alias for Results using AuditError

use thiserror::Error;

// ============================================================================
// DOMAIN ERROR TYPE
// ============================================================================

/// Errors that abort an audit operation.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Invalid or malformed URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP client could not be set up
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Unknown category key
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// A blocking worker failed to complete
    #[error("Worker error: {0}")]
    WorkerError(String),

    /// Generic error with context
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AuditError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::NetworkError(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn invalid_url(msg: impl Into<String>) -> Self {
        Self::InvalidUrl(msg.into())
    }
}

impl From<url::ParseError> for AuditError {
    fn from(error: url::ParseError) -> Self {
        Self::InvalidUrl(error.to_string())
    }
}

/// Result type alias using AuditError.
pub type Result<T> = std::result::Result<T, AuditError>;
