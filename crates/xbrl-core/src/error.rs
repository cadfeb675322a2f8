//! Error types for fetch and stitch operations.
//!
//! This module defines [`XbrlError`] which covers every failure that can occur
//! while resolving a company, fetching its facts, stitching a concept, or
//! exporting the result. An empty stitched series is *not* an error.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while fetching or stitching XBRL facts.
#[derive(Error, Debug)]
pub enum XbrlError {
    /// The requested concept key is not registered in the tag catalog.
    #[error("Unknown concept: {0}")]
    UnknownConcept(String),

    /// The ticker or CIK is not known upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded by the upstream provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<Duration>,
    },

    /// Timeouts, connection failures and 5xx responses.
    #[error("Transient network error: {0}")]
    TransientNetwork(String),

    /// Non-retryable network errors (unexpected HTTP status, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Error parsing an upstream payload.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error interacting with the fact cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Error writing a series or table to CSV/JSON.
    #[error("Export error: {0}")]
    Export(String),
}

impl XbrlError {
    /// Returns true if the caller may retry the operation with backoff.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::TransientNetwork(_))
    }

    /// Returns the provider's suggested wait, if any.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Result type alias using [`XbrlError`].
pub type Result<T> = std::result::Result<T, XbrlError>;
