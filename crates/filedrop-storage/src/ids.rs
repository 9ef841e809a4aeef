//! Batch identifiers

use std::fmt;
use std::sync::Arc;

use filedrop_core::is_valid_filename;
use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

/// Length of a generated batch id.
pub const BATCH_ID_LEN: usize = 8;

/// Source of candidate batch ids. Swapped out in tests to force collisions.
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// First eight lowercase hex characters of a random v4 UUID.
pub fn generate_batch_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(BATCH_ID_LEN);
    id
}

/// Name of a batch directory under the storage root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchId(String);

impl BatchId {
    /// Accept `id` only if it is a single safe path component.
    pub fn parse(id: &str) -> StorageResult<Self> {
        if !is_valid_filename(id) {
            return Err(StorageError::InvalidKey(format!("Invalid batch id: {:?}", id)));
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BatchId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_short_lowercase_hex() {
        for _ in 0..32 {
            let id = generate_batch_id();
            assert_eq!(id.len(), BATCH_ID_LEN);
            assert!(id
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
            assert!(BatchId::parse(&id).is_ok());
        }
    }

    #[test]
    fn test_parse_rejects_path_like_ids() {
        for bad in ["", ".", "..", "../etc", "a/b", "a b"] {
            assert!(
                matches!(BatchId::parse(bad), Err(StorageError::InvalidKey(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
