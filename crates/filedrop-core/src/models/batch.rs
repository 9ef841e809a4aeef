use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored file inside a batch, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFileEntry {
    pub name: String,
    /// `None` when the file could not be stat'ed while listing.
    pub size_bytes: Option<u64>,
    /// Human readable size; empty when `size_bytes` is unknown.
    pub size: String,
}

impl BatchFileEntry {
    pub fn new(name: String, size_bytes: Option<u64>) -> Self {
        let size = size_bytes.map(crate::format::format_bytes).unwrap_or_default();
        Self {
            name,
            size_bytes,
            size,
        }
    }
}

/// A batch directory and the files it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchListing {
    pub id: String,
    /// Directory modification time. `None` sorts last.
    pub modified_at: Option<DateTime<Utc>>,
    /// Sorted by name.
    pub files: Vec<BatchFileEntry>,
}
