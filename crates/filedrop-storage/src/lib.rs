//! Filedrop Storage Library
//!
//! Batch storage on the local filesystem. Every upload batch is a directory
//! directly under the storage root, named by its allocated id:
//!
//! ```text
//! <root>/<batch_id>/<file_name>
//! ```
//!
//! There is no sidecar metadata; listings are rebuilt from the directory tree
//! on every call. Batch ids and file names are single path components checked
//! against the filename rule from `filedrop-core`, so no operation can reach
//! outside the root.

pub mod factory;
pub mod ids;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_batch_store;
pub use ids::{generate_batch_id, BatchId, IdGenerator};
pub use local::LocalBatchStore;
pub use traits::{BatchStore, StorageError, StorageResult};
