//! Storage Layer
//!
//! Provides the in-memory municipality store with repository pattern.

mod record;
mod repository;

pub use record::{Municipality, MunicipalityFields};
pub use repository::{InsertSummary, MunicipalityRepository, DEFAULT_STORE_NAME};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}
