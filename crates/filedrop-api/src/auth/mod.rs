//! HTTP basic authentication with a single shared credential.

pub mod middleware;

pub use middleware::{auth_middleware, AuthState};
