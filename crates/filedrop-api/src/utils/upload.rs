//! Multipart extraction for batch uploads

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use filedrop_core::{AppError, CandidateFile};

/// Form field carrying the uploaded files; repeated once per file.
pub const FILES_FIELD: &str = "files";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Request body too large: {}", err.body_text()))
    } else {
        AppError::BadRequest(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Collect every `files` part of the form, in submission order.
///
/// Browsers send one empty, unnamed part when the file input was left empty;
/// such parts are dropped so the validator sees an empty batch. Other fields
/// are ignored.
pub async fn extract_batch_files(mut multipart: Multipart) -> Result<Vec<CandidateFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

        let data = field.bytes().await.map_err(multipart_error)?;

        if file_name.is_empty() && data.is_empty() {
            continue;
        }

        files.push(CandidateFile::new(file_name, content_type, data));
    }

    Ok(files)
}
