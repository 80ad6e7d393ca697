//! Store error type.

use shared_types::SyncError;
use thiserror::Error;

/// Failures of the local fallback store.
///
/// Corrupted *stored* data is not represented here: it degrades to an
/// empty collection at load time. These errors cover live I/O and
/// serialization problems only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Underlying file I/O failed.
    #[error("store i/o failure: {0}")]
    Io(String),

    /// A record could not be serialized for storage.
    #[error("record serialization failed: {0}")]
    Serialize(String),
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        SyncError::StoreFailure(e.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialize(e.to_string())
    }
}
