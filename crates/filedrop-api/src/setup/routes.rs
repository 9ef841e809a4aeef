//! Route configuration and setup.

use crate::auth::{auth_middleware, AuthState};
use crate::handlers;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use filedrop_infra::{
    request_id_middleware, request_span, security_headers_middleware, SecurityHeaders,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let config = state.config.clone();

    let auth_state = Arc::new(AuthState::new(
        config.username.clone(),
        config.password.clone(),
    ));

    let protected_routes = protected_routes()
        .layer(DefaultBodyLimit::max(config.max_request_body_bytes()))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    let mut public_routes = Router::new().route("/health", get(handlers::health::liveness_check));

    if config.serve_files {
        public_routes =
            public_routes.nest_service("/files", ServeDir::new(&config.storage_root));
        tracing::info!(root = %config.storage_root.display(), "Serving stored files under /files");
    }

    let app = public_routes
        .merge(protected_routes)
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            SecurityHeaders::for_environment(config.environment),
            security_headers_middleware,
        ))
        .with_state(state);

    Ok(app)
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(handlers::home::home).post(handlers::upload::upload),
        )
        .route("/delete", get(handlers::delete::delete))
        .route("/logs", get(handlers::logs::logs))
        .route("/api/batches", get(handlers::batches::list_batches))
}
