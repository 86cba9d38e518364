//! Batched ingestion.

use invgraph_core::compile::DICT_LIST;
use invgraph_core::schema::{SUB_RESOURCE_ID, SUB_RESOURCE_LABEL};
use invgraph_core::{CompiledQuery, MatchlinkSchema, NodeSchema};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{ensure_indexes, ensure_matchlink_indexes, require, LoadSummary};
use crate::config::SyncOptions;
use crate::error::{SyncError, SyncResult};
use crate::executor::{GraphExecutor, Statement};
use crate::params::Parameters;

/// Load rows for a node schema.
///
/// Ensures indexes, then MERGEs the rows in sequential batches of
/// `options.batch_size`. Empty input sends nothing.
pub async fn load<E, T>(
    executor: &E,
    schema: &NodeSchema,
    rows: &[T],
    params: &Parameters,
    options: &SyncOptions,
) -> SyncResult<LoadSummary>
where
    E: GraphExecutor + ?Sized,
    T: Serialize,
{
    if rows.is_empty() {
        debug!(label = schema.label(), "No rows to load");
        return Ok(LoadSummary::default());
    }
    let ingestion = &schema.plan().ingestion;
    require(schema.label(), params, ingestion.caller_parameters())?;
    let rows = to_values(rows)?;

    ensure_indexes(executor, schema).await?;
    run_batches(executor, schema.label(), ingestion, rows, params, options).await
}

/// Load rows for a matchlink.
///
/// Both scope markers must be present and non-null in `params`; this is
/// checked first, even for empty input.
pub async fn load_matchlinks<E, T>(
    executor: &E,
    schema: &MatchlinkSchema,
    rows: &[T],
    params: &Parameters,
    options: &SyncOptions,
) -> SyncResult<LoadSummary>
where
    E: GraphExecutor + ?Sized,
    T: Serialize,
{
    for marker in [SUB_RESOURCE_LABEL, SUB_RESOURCE_ID] {
        // A null marker writes no property, leaving the link outside every cleanup scope.
        if params.get(marker).map_or(true, Value::is_null) {
            return Err(SyncError::MissingScopeParameter {
                rel_label: schema.rel_label().to_string(),
                name: marker,
            });
        }
    }
    if rows.is_empty() {
        debug!(rel_label = schema.rel_label(), "No matchlink rows to load");
        return Ok(LoadSummary::default());
    }
    let ingestion = &schema.plan().ingestion;
    require(schema.rel_label(), params, ingestion.caller_parameters())?;
    let rows = to_values(rows)?;

    ensure_matchlink_indexes(executor, schema).await?;
    run_batches(executor, schema.rel_label(), ingestion, rows, params, options).await
}

async fn run_batches<E: GraphExecutor + ?Sized>(
    executor: &E,
    label: &str,
    query: &CompiledQuery,
    rows: Vec<Value>,
    params: &Parameters,
    options: &SyncOptions,
) -> SyncResult<LoadSummary> {
    let total = rows.len();
    info!(label, rows = total, batch_size = options.batch_size(), "Loading rows");

    let mut summary = LoadSummary::default();
    for (batch, chunk) in rows.chunks(options.batch_size()).enumerate() {
        let statement = Statement::new(query.text(), params.clone()).param(DICT_LIST, chunk.to_vec());
        executor.run(statement).await?;
        summary.batches += 1;
        summary.rows += chunk.len();
        debug!(label, batch, rows = chunk.len(), "Batch loaded");
    }

    info!(label, rows = summary.rows, batches = summary.batches, "Load complete");
    Ok(summary)
}

/// Serialize rows, requiring each to be a JSON object.
fn to_values<T: Serialize>(rows: &[T]) -> SyncResult<Vec<Value>> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| match serde_json::to_value(row) {
            Ok(value @ Value::Object(_)) => Ok(value),
            Ok(other) => Err(SyncError::InvalidRow {
                index,
                reason: format!("got {other}"),
            }),
            Err(e) => Err(SyncError::InvalidRow {
                index,
                reason: e.to_string(),
            }),
        })
        .collect()
}
