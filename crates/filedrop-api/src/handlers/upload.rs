use crate::error::HttpAppError;
use crate::flash::{flash_cookie, Flash};
use crate::state::AppState;
use crate::utils::upload::extract_batch_files;
use axum::{
    extract::{Multipart, State},
    response::Redirect,
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

/// Accept an upload form and redirect back to the page with the outcome.
///
/// Only an unreadable request body is answered with an error status; every
/// validation or storage outcome goes into the flash message.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<(CookieJar, Redirect), HttpAppError> {
    let files = extract_batch_files(multipart).await?;

    let flash = match state.upload_service.upload(files).await {
        Ok(outcome) => Flash::success(outcome.message()),
        Err(err) => Flash::error(err.user_message()),
    };

    let key = state.flash.put(flash).await;

    Ok((jar.add(flash_cookie(key, state.flash.ttl())), Redirect::to("/")))
}
