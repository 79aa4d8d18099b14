//! API Error Types

use storage::StorageError;
use thiserror::Error;
use upstream::FetchError;

/// Errors surfaced by the municipality handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}
