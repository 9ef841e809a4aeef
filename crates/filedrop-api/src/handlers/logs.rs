use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use filedrop_core::AppError;
use std::io::ErrorKind;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

/// Stream the server log file as plain text.
pub async fn logs(State(state): State<Arc<AppState>>) -> Result<Response, HttpAppError> {
    let path = &state.config.log_file;

    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::NotFound("No log file available".to_string()).into());
        }
        Err(e) => {
            return Err(AppError::Internal(format!(
                "Failed to open log file {}: {}",
                path.display(),
                e
            ))
            .into());
        }
    };

    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response())
}
