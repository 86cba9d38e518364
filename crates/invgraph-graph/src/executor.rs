//! The seam between the sync orchestrator and a Cypher endpoint.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SyncResult;
use crate::params::Parameters;

/// One parameterized statement ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub text: String,
    pub params: Parameters,
}

impl Statement {
    pub fn new(text: impl Into<String>, params: Parameters) -> Self {
        Self {
            text: text.into(),
            params,
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name, value);
        self
    }
}

/// Something that can run Cypher statements.
///
/// Implemented by [`GraphClient`](crate::GraphClient) for Neo4j; tests use an
/// in-memory recorder.
#[async_trait]
pub trait GraphExecutor: Send + Sync {
    /// Run a statement and discard any result.
    async fn run(&self, statement: Statement) -> SyncResult<()>;

    /// Run a statement and read the integer `column` of its first row, or 0
    /// when it returns no rows.
    async fn fetch_count(&self, statement: Statement, column: &str) -> SyncResult<i64>;
}
