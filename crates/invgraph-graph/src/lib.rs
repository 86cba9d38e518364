//! # invgraph graph
//!
//! Neo4j integration for invgraph schemas: loads rows through the compiled
//! ingestion queries, creates indexes, and runs scoped staleness cleanup.

pub mod bolt;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod params;
pub mod sync;

pub use client::{GraphClient, GraphCounts};
pub use config::{Config, GraphConfig, SyncOptions};
pub use error::{SyncError, SyncResult};
pub use executor::{GraphExecutor, Statement};
pub use params::Parameters;
pub use sync::{
    ensure_indexes, ensure_matchlink_indexes, load, load_matchlinks, run_cleanup, run_cleanup_for_matchlink,
    CleanupJob, CleanupSummary, LoadSummary,
};
