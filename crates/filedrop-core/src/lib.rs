//! Filedrop Core Library
//!
//! This crate provides the domain models, error types, configuration, and upload
//! validation that are shared across all filedrop components.

pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, Environment};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use format::format_bytes;
pub use models::{BatchFileEntry, BatchListing, CandidateFile};
pub use storage_types::PartialUploadPolicy;
pub use validation::{is_valid_filename, UploadPolicy, ValidationError};
