//! Error types for resolution and storage operations.
//!
//! This module defines [`ScoreError`], which covers every failure that can
//! abort the resolution of a single instrument. Data-quality problems
//! (unparsable numbers, short histories, missing headers) are not errors:
//! they degrade to neutral values where they are read.

use thiserror::Error;

/// Errors that can occur while resolving, fetching or storing instruments.
#[derive(Error, Debug)]
pub enum ScoreError {
    /// Network-related errors (connection failures, timeouts, non-2xx status).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by the live source.
    #[error("Rate limited by {source_name}: retry after {retry_after:?}")]
    RateLimited {
        /// The source that rate limited the request.
        source_name: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The requested instrument was not found.
    #[error("Instrument not found: {0}")]
    NotFound(String),

    /// A document could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error interacting with the document store.
    #[error("Store error: {0}")]
    Store(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Writing the output stream failed.
    #[error("Output error: {0}")]
    Output(String),

    /// A required collaborator is not configured.
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`ScoreError`].
pub type Result<T> = std::result::Result<T, ScoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ScoreError::NotFound("Tata Motors".to_string());
        assert_eq!(err.to_string(), "Instrument not found: Tata Motors");

        let err = ScoreError::RateLimited {
            source_name: "screener".to_string(),
            retry_after: None,
        };
        assert!(err.to_string().starts_with("Rate limited by screener"));
    }
}
