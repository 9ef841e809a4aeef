//! Batch store abstraction
//!
//! This module defines the BatchStore trait implemented by storage backends.

use async_trait::async_trait;
use filedrop_core::{BatchListing, CandidateFile};
use thiserror::Error;

use crate::ids::BatchId;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to allocate batch id: {0}")]
    AllocationFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Listing failed: {0}")]
    ListFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage for upload batches.
///
/// Upload handlers call `allocate_id` then `place_batch` with an already
/// validated batch. Removal is best-effort: failures are logged by the
/// implementation and never reported to the caller.
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Reserve a fresh batch id. The batch directory exists once this returns.
    async fn allocate_id(&self) -> StorageResult<BatchId>;

    /// Write every file of the batch under its id, stopping at the first
    /// failure. Returns the number of files written.
    async fn place_batch(&self, id: &BatchId, files: &[CandidateFile]) -> StorageResult<usize>;

    /// All batches, most recently modified first.
    async fn list_batches(&self) -> StorageResult<Vec<BatchListing>>;

    /// Remove a batch and everything in it. A missing batch is not an error.
    async fn remove_batch(&self, id: &str);

    /// Remove one file, then the batch directory if that left it empty.
    async fn remove_file(&self, id: &str, file_name: &str);
}
