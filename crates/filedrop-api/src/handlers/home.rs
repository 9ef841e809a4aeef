use crate::flash::{key_from_jar, removal_cookie, FLASH_COOKIE};
use crate::render::render_home;
use crate::state::AppState;
use axum::{extract::State, response::Html};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

/// Upload page with the current listing and any pending flash message.
pub async fn home(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Html<String>) {
    let flash = match key_from_jar(&jar) {
        Some(key) => state.flash.take(key).await,
        None => None,
    };

    let batches = match state.store.list_batches().await {
        Ok(batches) => batches,
        Err(e) => {
            tracing::error!(error = %e, "Failed to list batches");
            Vec::new()
        }
    };

    let page = Html(render_home(
        &batches,
        flash.as_ref(),
        state.config.url_prefix(),
    ));

    let jar = if jar.get(FLASH_COOKIE).is_some() {
        jar.remove(removal_cookie())
    } else {
        jar
    };

    (jar, page)
}
