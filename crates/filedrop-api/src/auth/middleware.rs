use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::TypedHeader;
use axum_extra::headers::{authorization::Basic, Authorization};
use axum_extra::typed_header::TypedHeaderRejection;
use filedrop_core::AppError;
use std::sync::Arc;
use subtle::ConstantTimeEq;

const CHALLENGE: &str = "Basic realm=\"filedrop\", charset=\"UTF-8\"";

#[derive(Clone)]
pub struct AuthState {
    pub username: String,
    pub password: String,
}

impl AuthState {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Check decoded Basic credentials against the configured pair.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        // Evaluate both comparisons so timing does not reveal which one failed
        let user_ok = secure_compare(username, &self.username);
        let pass_ok = secure_compare(password, &self.password);
        user_ok & pass_ok
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized() -> Response {
    let mut response =
        HttpAppError(AppError::Unauthorized("Invalid credentials".to_string())).into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static(CHALLENGE),
    );
    response
}

/// A missing or malformed `Authorization` header is a 401 like a wrong
/// password, hence the `Result` extractor instead of a rejection.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    credentials: Result<TypedHeader<Authorization<Basic>>, TypedHeaderRejection>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = credentials
        .map(|TypedHeader(auth)| auth_state.verify(auth.username(), auth.password()))
        .unwrap_or(false);

    if !authorized {
        tracing::debug!(
            method = %request.method(),
            path = %request.uri().path(),
            "Rejected request without valid credentials"
        );
        return unauthorized();
    }

    next.run(request).await
}
