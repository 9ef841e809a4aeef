//! Storage initialization

use anyhow::{Context, Result};
use filedrop_core::Config;
use filedrop_storage::{create_batch_store, BatchStore};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn BatchStore>> {
    create_batch_store(config)
        .await
        .with_context(|| format!("Failed to open storage root {}", config.storage_root.display()))
}
