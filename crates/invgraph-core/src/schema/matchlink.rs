//! Matchlinks: relationships drawn between nodes that already exist.

use std::sync::OnceLock;

use super::container::NodeMatcher;
use super::relationship::{RelationshipSchema, SourceNode};
use super::{LASTUPDATED, SUB_RESOURCE_ID, SUB_RESOURCE_LABEL};
use crate::error::{SchemaError, SchemaResult};
use crate::plan::MatchlinkPlan;

/// A validated relationship schema usable as a matchlink.
///
/// Guarantees a source node and the two scope markers, both bound to run
/// parameters, so cleanup can always be limited to one sub-resource.
#[derive(Debug, Clone)]
pub struct MatchlinkSchema {
    rel: RelationshipSchema,
    source: SourceNode,
    plan: OnceLock<MatchlinkPlan>,
}

impl MatchlinkSchema {
    pub fn new(rel: RelationshipSchema) -> SchemaResult<Self> {
        let source = rel.source().cloned().ok_or_else(|| SchemaError::MissingSource {
            rel_label: rel.rel_label().to_string(),
        })?;
        let owner = rel.describe();
        for marker in [LASTUPDATED, SUB_RESOURCE_LABEL, SUB_RESOURCE_ID] {
            rel.properties().require_parameter(&owner, marker)?;
        }
        // Cleanup compares the markers against these exact parameter names.
        for marker in [SUB_RESOURCE_LABEL, SUB_RESOURCE_ID] {
            if rel.properties().get(marker).map(|p| p.name()) != Some(marker) {
                return Err(SchemaError::ScopeMarkerBinding {
                    owner,
                    property: marker,
                });
            }
        }
        Ok(Self {
            rel,
            source,
            plan: OnceLock::new(),
        })
    }

    pub fn relationship(&self) -> &RelationshipSchema {
        &self.rel
    }

    pub fn rel_label(&self) -> &str {
        self.rel.rel_label()
    }

    pub fn source_label(&self) -> &str {
        &self.source.label
    }

    pub fn source_matcher(&self) -> &NodeMatcher {
        &self.source.matcher
    }

    /// Compiled queries for this matchlink, computed once per instance.
    pub fn plan(&self) -> &MatchlinkPlan {
        self.plan.get_or_init(|| MatchlinkPlan::compile(self))
    }
}
