//! Filedrop Infrastructure Library
//!
//! Shared infrastructure for the filedrop server:
//! - Middleware (request ID, security headers)
//! - Tracing initialization

pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use middleware::{
    get_request_id, request_id_middleware, request_span, security_headers_middleware, RequestId,
    SecurityHeaders,
};
pub use telemetry::init_telemetry;
