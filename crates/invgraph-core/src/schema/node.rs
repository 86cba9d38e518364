//! Node schemas and their cleanup scope.

use std::sync::OnceLock;

use super::container::NodeProperties;
use super::property::MatchMode;
use super::relationship::RelationshipSchema;
use super::{ID, LASTUPDATED};
use crate::error::{SchemaError, SchemaResult};
use crate::plan::QueryPlan;

/// How stale data of a node type is cleaned up.
///
/// A sub-resource relationship with unscoped cleanup has no variant: it claims an
/// owner for every node while asking to delete nodes of every owner, and the builder
/// rejects it with [`SchemaError::UnscopedSubResource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupScope {
    /// Nodes and relationships are deleted only within the sub-resource they hang off.
    SubResource(RelationshipSchema),
    /// No owning sub-resource: only stale relationships are deleted, never nodes.
    RelationshipsOnly,
    /// Stale nodes and relationships are deleted across the whole graph.
    Unscoped,
}

/// A node type, its properties, and the relationships written alongside it.
///
/// Built once and shared read-only. The compiled [`QueryPlan`] is memoized on the
/// instance the first time [`NodeSchema::plan`] is called.
#[derive(Debug, Clone)]
pub struct NodeSchema {
    label: String,
    properties: NodeProperties,
    extra_labels: Vec<String>,
    cleanup: CleanupScope,
    other_relationships: Vec<RelationshipSchema>,
    plan: OnceLock<QueryPlan>,
}

impl NodeSchema {
    pub fn builder(label: impl Into<String>, properties: NodeProperties) -> NodeSchemaBuilder {
        NodeSchemaBuilder {
            label: label.into(),
            properties,
            extra_labels: Vec::new(),
            sub_resource: None,
            other_relationships: Vec::new(),
            scoped_cleanup: true,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn properties(&self) -> &NodeProperties {
        &self.properties
    }

    pub fn extra_labels(&self) -> &[String] {
        &self.extra_labels
    }

    pub fn cleanup_scope(&self) -> &CleanupScope {
        &self.cleanup
    }

    pub fn sub_resource_relationship(&self) -> Option<&RelationshipSchema> {
        match &self.cleanup {
            CleanupScope::SubResource(rel) => Some(rel),
            _ => None,
        }
    }

    pub fn scoped_cleanup(&self) -> bool {
        !matches!(self.cleanup, CleanupScope::Unscoped)
    }

    pub fn other_relationships(&self) -> &[RelationshipSchema] {
        &self.other_relationships
    }

    /// All relationships, sub-resource first.
    pub fn relationships(&self) -> impl Iterator<Item = &RelationshipSchema> {
        self.sub_resource_relationship()
            .into_iter()
            .chain(self.other_relationships.iter())
    }

    /// Compiled queries for this schema, computed once per instance.
    pub fn plan(&self) -> &QueryPlan {
        self.plan.get_or_init(|| QueryPlan::compile(self))
    }
}

/// Builder for [`NodeSchema`]. `scoped_cleanup` defaults to `true`.
#[derive(Debug, Clone)]
pub struct NodeSchemaBuilder {
    label: String,
    properties: NodeProperties,
    extra_labels: Vec<String>,
    sub_resource: Option<RelationshipSchema>,
    other_relationships: Vec<RelationshipSchema>,
    scoped_cleanup: bool,
}

impl NodeSchemaBuilder {
    pub fn extra_label(mut self, label: impl Into<String>) -> Self {
        self.extra_labels.push(label.into());
        self
    }

    pub fn sub_resource(mut self, rel: RelationshipSchema) -> Self {
        self.sub_resource = Some(rel);
        self
    }

    pub fn other_relationship(mut self, rel: RelationshipSchema) -> Self {
        self.other_relationships.push(rel);
        self
    }

    pub fn scoped_cleanup(mut self, scoped: bool) -> Self {
        self.scoped_cleanup = scoped;
        self
    }

    pub fn build(self) -> SchemaResult<NodeSchema> {
        if self.label.is_empty() {
            return Err(SchemaError::EmptyName("node label"));
        }
        if self.extra_labels.iter().any(String::is_empty) {
            return Err(SchemaError::EmptyName("extra label"));
        }
        let owner = format!("Node '{}'", self.label);
        self.properties.check_unique(&owner)?;
        for required in [ID, LASTUPDATED] {
            if !self.properties.contains(required) {
                return Err(SchemaError::missing(&owner, required));
            }
        }

        let cleanup = match (self.sub_resource, self.scoped_cleanup) {
            (Some(rel), true) => {
                // The owner id is injected per run, so the matcher can never read rows.
                if let Some((field, _)) = rel.target_matcher().iter().find(|(_, p)| !p.is_parameter()) {
                    return Err(SchemaError::RowScopedSubResourceMatcher {
                        label: self.label,
                        field: field.to_string(),
                    });
                }
                // Cleanup filters on the owner match, so it must pin exactly one owner.
                for (field, prop) in rel.target_matcher().iter() {
                    let mode = match prop.match_mode() {
                        MatchMode::Fuzzy => "fuzzy_and_ignore_case",
                        MatchMode::OneToMany => "one_to_many",
                        MatchMode::Exact | MatchMode::IgnoreCase => continue,
                    };
                    return Err(SchemaError::NonExactSubResourceMatcher {
                        label: self.label,
                        field: field.to_string(),
                        mode,
                    });
                }
                CleanupScope::SubResource(rel)
            }
            (Some(_), false) => return Err(SchemaError::UnscopedSubResource { label: self.label }),
            (None, true) => CleanupScope::RelationshipsOnly,
            (None, false) => CleanupScope::Unscoped,
        };

        Ok(NodeSchema {
            label: self.label,
            properties: self.properties,
            extra_labels: self.extra_labels,
            cleanup,
            other_relationships: self.other_relationships,
            plan: OnceLock::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Direction, NodeMatcher, PropertyRef, RelProperties};

    fn props() -> NodeProperties {
        NodeProperties::new()
            .with(ID, PropertyRef::row("Id"))
            .with(LASTUPDATED, PropertyRef::param(LASTUPDATED))
    }

    fn account_rel(id: PropertyRef) -> RelationshipSchema {
        RelationshipSchema::builder("RESOURCE", Direction::Inward)
            .target("AWSAccount", NodeMatcher::new().with("id", id))
            .properties(RelProperties::new().with(LASTUPDATED, PropertyRef::param(LASTUPDATED)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_sub_resource_with_scoped_cleanup() {
        let schema = NodeSchema::builder("EC2Instance", props())
            .sub_resource(account_rel(PropertyRef::param("AWS_ID")))
            .build()
            .unwrap();
        assert!(matches!(schema.cleanup_scope(), CleanupScope::SubResource(_)));
        assert!(schema.scoped_cleanup());
        assert_eq!(schema.relationships().count(), 1);
    }

    #[test]
    fn test_sub_resource_without_scoped_cleanup_rejected() {
        let err = NodeSchema::builder("EC2Instance", props())
            .sub_resource(account_rel(PropertyRef::param("AWS_ID")))
            .scoped_cleanup(false)
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnscopedSubResource { label } if label == "EC2Instance"));
    }

    #[test]
    fn test_row_scoped_sub_resource_matcher_rejected() {
        let err = NodeSchema::builder("EC2Instance", props())
            .sub_resource(account_rel(PropertyRef::row("AccountId")))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::RowScopedSubResourceMatcher { field, .. } if field == "id"));
    }

    #[test]
    fn test_non_exact_sub_resource_matcher_rejected() {
        let fuzzy = NodeSchema::builder("Device", props())
            .sub_resource(account_rel(PropertyRef::param("TENANT").fuzzy_and_ignore_case()))
            .build()
            .unwrap_err();
        assert!(matches!(
            fuzzy,
            SchemaError::NonExactSubResourceMatcher { field, mode: "fuzzy_and_ignore_case", .. } if field == "id"
        ));

        let many = NodeSchema::builder("Device", props())
            .sub_resource(account_rel(PropertyRef::param("TENANT").one_to_many()))
            .build()
            .unwrap_err();
        assert!(matches!(many, SchemaError::NonExactSubResourceMatcher { mode: "one_to_many", .. }));

        NodeSchema::builder("Device", props())
            .sub_resource(account_rel(PropertyRef::param("TENANT").ignore_case()))
            .build()
            .unwrap();
    }

    #[test]
    fn test_cleanup_scope_without_sub_resource() {
        let scoped = NodeSchema::builder("Tag", props()).build().unwrap();
        assert_eq!(scoped.cleanup_scope(), &CleanupScope::RelationshipsOnly);

        let unscoped = NodeSchema::builder("Tag", props()).scoped_cleanup(false).build().unwrap();
        assert_eq!(unscoped.cleanup_scope(), &CleanupScope::Unscoped);
        assert!(!unscoped.scoped_cleanup());
    }

    #[test]
    fn test_id_and_lastupdated_required() {
        let no_id = NodeProperties::new().with(LASTUPDATED, PropertyRef::param(LASTUPDATED));
        assert!(matches!(
            NodeSchema::builder("Tag", no_id).build(),
            Err(SchemaError::MissingProperty { property, .. }) if property == ID
        ));

        let no_tag = NodeProperties::new().with(ID, PropertyRef::row("Id"));
        assert!(matches!(
            NodeSchema::builder("Tag", no_tag).build(),
            Err(SchemaError::MissingProperty { property, .. }) if property == LASTUPDATED
        ));
    }

    #[test]
    fn test_relationships_put_sub_resource_first() {
        let other = RelationshipSchema::builder("MEMBER_OF", Direction::Outward)
            .target("SecurityGroup", NodeMatcher::new().with("id", PropertyRef::row("GroupId")))
            .properties(RelProperties::new().with(LASTUPDATED, PropertyRef::param(LASTUPDATED)))
            .build()
            .unwrap();
        let schema = NodeSchema::builder("EC2Instance", props())
            .other_relationship(other)
            .sub_resource(account_rel(PropertyRef::param("AWS_ID")))
            .build()
            .unwrap();
        let labels: Vec<&str> = schema.relationships().map(|r| r.rel_label()).collect();
        assert_eq!(labels, vec!["RESOURCE", "MEMBER_OF"]);
    }

    #[test]
    fn test_plan_is_memoized() {
        let schema = NodeSchema::builder("Tag", props()).build().unwrap();
        let first: *const QueryPlan = schema.plan();
        let second: *const QueryPlan = schema.plan();
        assert_eq!(first, second);
    }
}
