//! Filedrop API Library
//!
//! HTTP surface of the file drop: the upload page, delete links, the log view
//! and a small JSON listing, plus application setup.

mod handlers;
mod render;
mod services;
mod utils;

pub mod auth;
pub mod error;
pub mod flash;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::upload::{UploadError, UploadOutcome, UploadService};
pub use state::AppState;
