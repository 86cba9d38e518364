//! Load and cleanup orchestration.
//!
//! Every entry point is generic over [`GraphExecutor`](crate::GraphExecutor),
//! takes a shared schema, and validates the caller's parameters before any
//! statement is sent.

mod cleanup;
mod indexes;
mod load;

pub use cleanup::{run_cleanup, run_cleanup_for_matchlink, CleanupJob};
pub use indexes::{ensure_indexes, ensure_matchlink_indexes};
pub use load::{load, load_matchlinks};

use crate::error::{SyncError, SyncResult};
use crate::params::Parameters;

/// Outcome of a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows: usize,
    pub batches: usize,
}

/// Outcome of a cleanup job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    /// Statements run to completion.
    pub statements: usize,
    /// Windows executed across all statements.
    pub windows: usize,
    /// Elements deleted.
    pub deleted: u64,
}

/// Fails with the first of `required` not present in `params`.
fn require<'a>(label: &str, params: &Parameters, required: impl Iterator<Item = &'a str>) -> SyncResult<()> {
    match params.first_missing(required) {
        Some(name) => Err(SyncError::MissingParameter {
            label: label.to_string(),
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}
