//! Shared HTTP middleware

pub mod request_id;
pub mod security_headers;

pub use request_id::{get_request_id, request_id_middleware, request_span, RequestId};
pub use security_headers::{security_headers_middleware, SecurityHeaders};
