//! Error types for the I/O boundary.
//!
//! The geometry core never fails: degenerate input maps to defined fallback
//! values. Errors only arise when talking to Overpass, and the fetcher turns
//! them into an empty feature list before they reach the core.

use thiserror::Error;

/// Errors raised while fetching or parsing waterway geometry.
#[derive(Debug, Error)]
pub enum OutbreakMapError {
    /// Transport-level failure (connect, timeout, TLS, body download)
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Overpass answered with a non-success status
    #[error("Overpass returned HTTP {status}")]
    Status { status: u16 },

    /// The response body was not a valid Overpass JSON document
    #[error("Failed to parse Overpass response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Every attempt failed with a retryable error
    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

impl OutbreakMapError {
    /// Whether another attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            #[cfg(feature = "http")]
            OutbreakMapError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            OutbreakMapError::Status { status } => *status == 429 || *status >= 500,
            OutbreakMapError::Parse(_) => false,
            OutbreakMapError::RetriesExhausted { .. } => false,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, OutbreakMapError>;
