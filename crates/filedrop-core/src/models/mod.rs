//! Domain models

pub mod batch;
pub mod upload;

pub use batch::{BatchFileEntry, BatchListing};
pub use upload::CandidateFile;
