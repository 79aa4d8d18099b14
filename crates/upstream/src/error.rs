//! Fetch Error Types

use thiserror::Error;

/// Errors that can occur while fetching from the upstream API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Upstream answered with a non-success status
    #[error("Upstream unavailable: HTTP {status}")]
    UpstreamUnavailable { status: u16 },

    /// Request never completed (DNS, connect, timeout, body read)
    #[error("Transport failure: {message}")]
    TransportFailure { message: String },

    /// Body was not a JSON array of municipalities
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::TransportFailure {
            message: err.to_string(),
        }
    }
}
