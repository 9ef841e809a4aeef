use std::fmt::{Display, Formatter, Result as FmtResult};

/// What happens to files already written when a later file of the same batch fails.
///
/// Defined in core because it is part of the configuration surface and is
/// consumed by the storage crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PartialUploadPolicy {
    /// Leave the partially written batch on disk; it shows up in listings.
    #[default]
    Keep,
    /// Remove the batch directory before reporting the failure.
    Rollback,
}

impl Display for PartialUploadPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PartialUploadPolicy::Keep => write!(f, "keep"),
            PartialUploadPolicy::Rollback => write!(f, "rollback"),
        }
    }
}
