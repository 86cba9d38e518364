//! Neo4j connection client.

use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph, Query};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::bolt::to_query;
use crate::config::GraphConfig;
use crate::error::{SyncError, SyncResult};
use crate::executor::{GraphExecutor, Statement};

/// Client for Neo4j.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Create a client and check the server answers.
    ///
    /// `Graph::connect` only builds the pool; the `RETURN 1` ping forces a real
    /// bolt handshake so an unreachable server fails here.
    pub async fn connect(config: &GraphConfig) -> SyncResult<Self> {
        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(config.max_connections)
            .build()?;

        let graph = Graph::connect(neo4j_config).await?;
        graph.run(Query::new("RETURN 1".to_string())).await?;
        debug!(uri = %config.uri, "Connected to Neo4j");

        Ok(Self { graph })
    }

    /// Execute a Cypher query that returns no results.
    pub async fn execute(&self, query: Query) -> SyncResult<()> {
        self.graph.run(query).await?;
        Ok(())
    }

    /// Execute a Cypher query and return results as rows.
    pub async fn query(&self, query: Query) -> SyncResult<Vec<neo4rs::Row>> {
        let mut result = self.graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a Cypher query and return one field of its first row.
    pub async fn query_scalar<T: DeserializeOwned>(&self, query: Query, field: &str) -> SyncResult<Option<T>> {
        let rows = self.query(query).await?;
        match rows.into_iter().next() {
            Some(row) => {
                let value = row
                    .get(field)
                    .map_err(|e| SyncError::conversion(format!("Failed to get field '{field}': {e:?}")))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Node and relationship counts for status display.
    pub async fn get_counts(&self) -> SyncResult<GraphCounts> {
        let node_query = Query::new("MATCH (n) RETURN count(n) as count".to_string());
        let rel_query = Query::new("MATCH ()-[r]->() RETURN count(r) as count".to_string());

        let nodes: i64 = self.query_scalar(node_query, "count").await?.unwrap_or(0);
        let relationships: i64 = self.query_scalar(rel_query, "count").await?.unwrap_or(0);

        Ok(GraphCounts {
            nodes: nodes as usize,
            relationships: relationships as usize,
        })
    }
}

#[async_trait]
impl GraphExecutor for GraphClient {
    async fn run(&self, statement: Statement) -> SyncResult<()> {
        self.execute(to_query(&statement)?).await
    }

    async fn fetch_count(&self, statement: Statement, column: &str) -> SyncResult<i64> {
        Ok(self.query_scalar(to_query(&statement)?, column).await?.unwrap_or(0))
    }
}

/// Node and relationship counts.
#[derive(Debug, Clone)]
pub struct GraphCounts {
    pub nodes: usize,
    pub relationships: usize,
}
