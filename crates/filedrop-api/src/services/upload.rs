//! Upload pipeline: validate, allocate, place.

use filedrop_core::{CandidateFile, UploadPolicy, ValidationError};
use filedrop_storage::{BatchId, BatchStore, StorageError};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl UploadError {
    /// Short message shown to the uploader.
    pub fn user_message(&self) -> String {
        match self {
            UploadError::Validation(err) => err.to_string(),
            UploadError::Storage(StorageError::AllocationFailed(_)) => {
                "Upload failed: could not create a new batch".to_string()
            }
            UploadError::Storage(StorageError::InvalidKey(msg)) => format!("Upload failed: {}", msg),
            UploadError::Storage(_) => "Upload failed: could not store files".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub batch_id: BatchId,
    pub file_count: usize,
}

impl UploadOutcome {
    pub fn message(&self) -> String {
        format!(
            "Upload {} files success under {}",
            self.file_count, self.batch_id
        )
    }
}

#[derive(Clone)]
pub struct UploadService {
    store: Arc<dyn BatchStore>,
    policy: UploadPolicy,
}

impl UploadService {
    pub fn new(store: Arc<dyn BatchStore>, policy: UploadPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Run one batch through the pipeline.
    ///
    /// Nothing touches the filesystem until every file has passed validation.
    pub async fn upload(&self, files: Vec<CandidateFile>) -> Result<UploadOutcome, UploadError> {
        if let Err(err) = self.policy.validate_batch(&files) {
            tracing::info!(file_count = files.len(), error = %err, "Upload rejected");
            return Err(err.into());
        }

        let batch_id = self.store.allocate_id().await?;
        let file_count = self.store.place_batch(&batch_id, &files).await?;

        tracing::info!(batch_id = %batch_id, file_count = file_count, "Upload accepted");

        Ok(UploadOutcome {
            batch_id,
            file_count,
        })
    }
}
