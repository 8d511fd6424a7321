//! Verdict persistence port

use council_domain::Verdict;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting a verdict
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence boundary for completed verdicts.
///
/// The verdict record is self-contained, so implementations can write
/// it anywhere without re-running the deliberation.
pub trait VerdictStore: Send + Sync {
    /// Persist the verdict, returning where it was written
    fn save(&self, verdict: &Verdict) -> Result<PathBuf, StoreError>;
}
