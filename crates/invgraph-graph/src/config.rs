//! Configuration file: connection settings and sync tuning.

use std::path::Path;

use serde::Deserialize;

use crate::error::SyncResult;

/// Top-level `invgraph.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub graph: GraphConfig,
    pub sync: SyncOptions,
}

impl Config {
    pub fn from_toml_str(content: &str) -> SyncResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> SyncResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "neo4j".to_string(),
            database: "neo4j".to_string(),
            max_connections: 4,
        }
    }
}

/// Batch and cleanup window sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// Rows sent per ingestion statement.
    pub batch_size: usize,
    /// Elements deleted per cleanup statement.
    pub cleanup_window: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            batch_size: 10_000,
            cleanup_window: 100,
        }
    }
}

impl SyncOptions {
    pub(crate) fn batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    pub(crate) fn cleanup_window(&self) -> usize {
        self.cleanup_window.max(1)
    }
}
