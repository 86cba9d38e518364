//! Errors raised while loading or cleaning up the graph.

use thiserror::Error;

/// Error type for sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Matchlink '{rel_label}' requires scope parameter '{name}'")]
    MissingScopeParameter { rel_label: String, name: &'static str },

    #[error("'{label}' requires run parameter '{name}'")]
    MissingParameter { label: String, name: String },

    #[error("Row {index} is not a JSON object: {reason}")]
    InvalidRow { index: usize, reason: String },

    #[error("Neo4j error: {0}")]
    Database(#[from] neo4rs::Error),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Schema error: {0}")]
    Schema(#[from] invgraph_core::SchemaError),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    pub(crate) fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }
}
