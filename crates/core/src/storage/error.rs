//! Storage error types.

use thiserror::Error;

/// Errors raised by the archive store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The provider configuration is invalid.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// The upload failed.
    #[error("archive upload failed: {0}")]
    Upload(String),
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        Self::Upload(err.to_string())
    }
}
