//! Staleness cleanup jobs.
//!
//! A job is the ordered list of cleanup statements for one schema together
//! with the parameters of the current run. Each statement deletes at most one
//! window of stale elements and is re-issued until a window comes back short.

use invgraph_core::compile::{LIMIT_SIZE, TOTAL_COMPLETED, UPDATE_TAG};
use invgraph_core::schema::{SUB_RESOURCE_ID, SUB_RESOURCE_LABEL};
use invgraph_core::{CompiledQuery, MatchlinkSchema, NodeSchema};
use serde_json::Value;
use tracing::{debug, info};

use super::{require, CleanupSummary};
use crate::config::SyncOptions;
use crate::error::SyncResult;
use crate::executor::{GraphExecutor, Statement};
use crate::params::Parameters;

#[derive(Debug, Clone)]
pub struct CleanupJob {
    label: String,
    statements: Vec<CompiledQuery>,
    params: Parameters,
}

impl CleanupJob {
    /// Job for a node schema. `params` must hold `UPDATE_TAG` and every
    /// parameter the owner matcher reads.
    pub fn from_node_schema(schema: &NodeSchema, params: &Parameters) -> SyncResult<Self> {
        let statements = schema.plan().cleanup.clone();
        for statement in &statements {
            require(schema.label(), params, statement.caller_parameters())?;
        }
        Ok(Self {
            label: schema.label().to_string(),
            statements,
            params: params.clone(),
        })
    }

    /// Job deleting stale links of a matchlink within one sub-resource.
    pub fn from_matchlink(
        schema: &MatchlinkSchema,
        sub_resource_label: &str,
        sub_resource_id: impl Into<Value>,
        update_tag: i64,
    ) -> Self {
        let params = Parameters::new()
            .with(UPDATE_TAG, update_tag)
            .with(SUB_RESOURCE_LABEL, sub_resource_label)
            .with(SUB_RESOURCE_ID, sub_resource_id);
        Self {
            label: schema.rel_label().to_string(),
            statements: vec![schema.plan().cleanup.clone()],
            params,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn statements(&self) -> &[CompiledQuery] {
        &self.statements
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Run every statement in order, each until it deletes fewer than
    /// `options.cleanup_window` elements.
    pub async fn run<E: GraphExecutor + ?Sized>(
        &self,
        executor: &E,
        options: &SyncOptions,
    ) -> SyncResult<CleanupSummary> {
        let window = options.cleanup_window();
        info!(label = %self.label, statements = self.statements.len(), window, "Starting cleanup");

        let mut summary = CleanupSummary::default();
        for query in &self.statements {
            loop {
                let statement = Statement::new(query.text(), self.params.clone()).param(LIMIT_SIZE, window);
                let deleted = executor.fetch_count(statement, TOTAL_COMPLETED).await?.max(0) as u64;
                summary.windows += 1;
                summary.deleted += deleted;
                debug!(label = %self.label, statement = summary.statements, deleted, "Cleanup window");
                if deleted < window as u64 {
                    break;
                }
            }
            summary.statements += 1;
        }

        info!(label = %self.label, deleted = summary.deleted, windows = summary.windows, "Cleanup complete");
        Ok(summary)
    }
}

/// Delete stale nodes and relationships of a node schema.
pub async fn run_cleanup<E: GraphExecutor + ?Sized>(
    executor: &E,
    schema: &NodeSchema,
    params: &Parameters,
    options: &SyncOptions,
) -> SyncResult<CleanupSummary> {
    CleanupJob::from_node_schema(schema, params)?.run(executor, options).await
}

/// Delete stale links of a matchlink owned by one sub-resource.
pub async fn run_cleanup_for_matchlink<E: GraphExecutor + ?Sized>(
    executor: &E,
    schema: &MatchlinkSchema,
    sub_resource_label: &str,
    sub_resource_id: impl Into<Value>,
    update_tag: i64,
    options: &SyncOptions,
) -> SyncResult<CleanupSummary> {
    CleanupJob::from_matchlink(schema, sub_resource_label, sub_resource_id, update_tag)
        .run(executor, options)
        .await
}
