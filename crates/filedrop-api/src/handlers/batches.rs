use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{extract::State, Json};
use filedrop_core::BatchListing;
use std::sync::Arc;

/// The same listing as the page, as JSON.
pub async fn list_batches(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BatchListing>>, HttpAppError> {
    let batches = state.store.list_batches().await?;
    Ok(Json(batches))
}
