//! Index creation.
//!
//! Safe to run repeatedly: every statement uses `IF NOT EXISTS`.

use invgraph_core::{MatchlinkSchema, NodeSchema};
use tracing::debug;

use crate::error::SyncResult;
use crate::executor::{GraphExecutor, Statement};
use crate::params::Parameters;

async fn create_all<E: GraphExecutor + ?Sized>(executor: &E, label: &str, statements: &[String]) -> SyncResult<()> {
    for statement in statements {
        executor.run(Statement::new(statement.as_str(), Parameters::new())).await?;
    }
    debug!(label, indexes = statements.len(), "Indexes ensured");
    Ok(())
}

/// Create the indexes backing a node schema's queries.
pub async fn ensure_indexes<E: GraphExecutor + ?Sized>(executor: &E, schema: &NodeSchema) -> SyncResult<()> {
    create_all(executor, schema.label(), &schema.plan().indexes).await
}

/// Create the indexes backing a matchlink's queries.
pub async fn ensure_matchlink_indexes<E: GraphExecutor + ?Sized>(
    executor: &E,
    schema: &MatchlinkSchema,
) -> SyncResult<()> {
    create_all(executor, schema.rel_label(), &schema.plan().indexes).await
}
