//! Error types for identifier lookup.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the RxNav service or the lookup cache.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LookupError {
    /// HTTP request failed.
    #[error("network error: {0}")]
    Network(String),

    /// RxNav answered with a non-success status.
    #[error("RxNav returned status {status} for '{name}'")]
    Status { status: u16, name: String },

    /// Request URL could not be built.
    #[error("invalid lookup URL: {0}")]
    InvalidUrl(String),

    /// Failed to write the cache file.
    #[error("failed to write lookup cache {path}: {message}")]
    CacheWrite { path: PathBuf, message: String },
}

impl LookupError {
    /// Returns whether a later retry could succeed: network failures,
    /// rate limiting and server errors.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidUrl(_) | Self::CacheWrite { .. } => false,
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Result type for lookup operations.
pub type Result<T> = std::result::Result<T, LookupError>;
