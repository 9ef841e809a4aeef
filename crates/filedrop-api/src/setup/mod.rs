//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use crate::flash::FlashStore;
use crate::services::upload::UploadService;
use crate::state::AppState;
use anyhow::{Context, Result};
use filedrop_core::Config;
use std::sync::Arc;

/// Initialize tracing and the whole application.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    filedrop_infra::init_telemetry(config.environment, &config.log_file)
        .context("Failed to initialize telemetry")?;

    build_app(config).await
}

/// Build state and router without touching the global subscriber.
pub async fn build_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;
    crate::error::set_error_details(!config.is_production());

    let store = storage::setup_storage(&config).await?;
    let upload_service = UploadService::new(store.clone(), config.upload_policy());

    let state = Arc::new(AppState {
        config: Arc::new(config),
        store,
        upload_service,
        flash: FlashStore::default(),
    });

    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
