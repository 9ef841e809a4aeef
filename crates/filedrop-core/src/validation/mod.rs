//! Upload batch validation
//!
//! Every candidate file is checked before anything touches the filesystem.
//! The first offending file rejects the whole batch.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::format::format_bytes;
use crate::models::CandidateFile;

static FILENAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("filename pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No file uploaded")]
    NoFiles,

    #[error("Too many files: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("Invalid file type [{content_type}] {file_name}")]
    InvalidContentType {
        content_type: String,
        file_name: String,
    },

    #[error("Invalid file name [{file_name}], only a-z,0-9,-,_,.")]
    InvalidFilename { file_name: String },

    #[error("File size too large <{} {file_name}", human_size(.max))]
    FileTooLarge {
        file_name: String,
        size: u64,
        max: u64,
    },

    #[error("Duplicate file name {file_name}")]
    DuplicateFilename { file_name: String },
}

fn human_size(bytes: &u64) -> String {
    format_bytes(*bytes)
}

/// Whether `name` is safe to use as a single path component under a batch.
///
/// Used for uploaded file names and again for batch ids and names received by
/// the delete endpoint.
pub fn is_valid_filename(name: &str) -> bool {
    name != "." && name != ".." && FILENAME_PATTERN.is_match(name)
}

/// Limits applied to every upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_file_size_bytes: u64,
    pub max_files: usize,
    /// Exact, case-sensitive content type matches.
    pub allowed_content_types: Vec<String>,
}

impl UploadPolicy {
    /// Validate a whole batch.
    ///
    /// Batch level checks run first, then each file in order: content type,
    /// name, size, duplicate name.
    pub fn validate_batch(&self, files: &[CandidateFile]) -> Result<(), ValidationError> {
        if files.is_empty() {
            return Err(ValidationError::NoFiles);
        }

        if files.len() > self.max_files {
            return Err(ValidationError::TooManyFiles {
                count: files.len(),
                max: self.max_files,
            });
        }

        let mut seen = HashSet::with_capacity(files.len());
        for file in files {
            self.validate_content_type(file)?;
            self.validate_filename(file)?;
            self.validate_file_size(file)?;

            if !seen.insert(file.file_name.as_str()) {
                return Err(ValidationError::DuplicateFilename {
                    file_name: file.file_name.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn validate_content_type(&self, file: &CandidateFile) -> Result<(), ValidationError> {
        if !self
            .allowed_content_types
            .iter()
            .any(|allowed| allowed == &file.content_type)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: file.content_type.clone(),
                file_name: file.file_name.clone(),
            });
        }

        Ok(())
    }

    pub fn validate_filename(&self, file: &CandidateFile) -> Result<(), ValidationError> {
        if !is_valid_filename(&file.file_name) {
            return Err(ValidationError::InvalidFilename {
                file_name: file.file_name.clone(),
            });
        }

        Ok(())
    }

    pub fn validate_file_size(&self, file: &CandidateFile) -> Result<(), ValidationError> {
        let size = file.size();
        if size > self.max_file_size_bytes {
            return Err(ValidationError::FileTooLarge {
                file_name: file.file_name.clone(),
                size,
                max: self.max_file_size_bytes,
            });
        }

        Ok(())
    }
}
