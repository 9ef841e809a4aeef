use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub dir: Option<String>,
    pub file: Option<String>,
}

/// Delete a whole batch, or one file of it, then go back to the page.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DeleteParams>,
) -> Redirect {
    let dir = params.dir.unwrap_or_default();
    let file = params.file.unwrap_or_default();

    if dir.is_empty() {
        return Redirect::to("/");
    }

    if file.is_empty() {
        state.store.remove_batch(&dir).await;
    } else {
        state.store.remove_file(&dir, &file).await;
    }

    Redirect::to("/")
}
