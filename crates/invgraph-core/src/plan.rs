//! Compiled, per-schema query plans.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::compile::{
    build_cleanup_queries, build_create_index_queries, build_create_index_queries_for_matchlink,
    build_ingestion_query, build_matchlink_cleanup_query, build_matchlink_query, DICT_LIST, LIMIT_SIZE,
};
use crate::cypher::CypherQuery;
use crate::schema::{MatchlinkSchema, NodeSchema};

/// Rendered Cypher text and the `$parameters` it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    text: String,
    parameters: BTreeSet<String>,
}

impl CompiledQuery {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Every parameter the statement references, sorted.
    pub fn parameters(&self) -> &BTreeSet<String> {
        &self.parameters
    }

    /// Parameters the caller must supply. The row list and the delete window
    /// are filled in by the executor.
    pub fn caller_parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .map(String::as_str)
            .filter(|name| *name != DICT_LIST && *name != LIMIT_SIZE)
    }
}

impl From<CypherQuery> for CompiledQuery {
    fn from(query: CypherQuery) -> Self {
        Self {
            parameters: query.parameters(),
            text: query.render(),
        }
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Everything compiled from one [`NodeSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub ingestion: CompiledQuery,
    pub indexes: Vec<String>,
    /// Cleanup statements in execution order.
    pub cleanup: Vec<CompiledQuery>,
}

impl QueryPlan {
    pub fn compile(schema: &NodeSchema) -> Self {
        let plan = Self {
            ingestion: build_ingestion_query(schema),
            indexes: build_create_index_queries(schema),
            cleanup: build_cleanup_queries(schema),
        };
        debug!(
            label = schema.label(),
            indexes = plan.indexes.len(),
            cleanup = plan.cleanup.len(),
            "Compiled node schema"
        );
        plan
    }
}

/// Everything compiled from one [`MatchlinkSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchlinkPlan {
    pub ingestion: CompiledQuery,
    pub indexes: Vec<String>,
    pub cleanup: CompiledQuery,
}

impl MatchlinkPlan {
    pub fn compile(schema: &MatchlinkSchema) -> Self {
        let plan = Self {
            ingestion: build_matchlink_query(schema),
            indexes: build_create_index_queries_for_matchlink(schema),
            cleanup: build_matchlink_cleanup_query(schema),
        };
        debug!(rel_label = schema.rel_label(), indexes = plan.indexes.len(), "Compiled matchlink");
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{NodeProperties, PropertyRef, ID, LASTUPDATED};

    #[test]
    fn test_plan_matches_direct_compilation() {
        let schema = NodeSchema::builder(
            "Tag",
            NodeProperties::new()
                .with(ID, PropertyRef::row("Key"))
                .with(LASTUPDATED, PropertyRef::param(LASTUPDATED)),
        )
        .scoped_cleanup(false)
        .build()
        .unwrap();
        let plan = schema.plan();
        assert_eq!(plan.ingestion, build_ingestion_query(&schema));
        assert_eq!(plan.cleanup, build_cleanup_queries(&schema));
        assert_eq!(plan.indexes.len(), 2);
        assert_eq!(plan.ingestion.to_string(), plan.ingestion.text());
    }

    #[test]
    fn test_caller_parameters_skip_executor_owned() {
        let schema = NodeSchema::builder(
            "Tag",
            NodeProperties::new()
                .with(ID, PropertyRef::row("Key"))
                .with(LASTUPDATED, PropertyRef::param(LASTUPDATED)),
        )
        .scoped_cleanup(false)
        .build()
        .unwrap();
        let cleanup = &schema.plan().cleanup[0];
        assert!(cleanup.parameters().contains(LIMIT_SIZE));
        assert_eq!(cleanup.caller_parameters().collect::<Vec<_>>(), vec!["UPDATE_TAG"]);
    }
}
