use crate::{BatchStore, LocalBatchStore, StorageResult};
use filedrop_core::Config;
use std::sync::Arc;

/// Create the batch store described by the configuration.
pub async fn create_batch_store(config: &Config) -> StorageResult<Arc<dyn BatchStore>> {
    let store = LocalBatchStore::new(&config.storage_root, config.partial_upload_policy).await?;

    tracing::info!(
        root = %config.storage_root.display(),
        partial_upload_policy = %config.partial_upload_policy,
        "Local batch store initialized"
    );

    Ok(Arc::new(store))
}
