//! Index statements for schemas.

use crate::cypher::IndexStatement;
use crate::schema::{
    MatchlinkSchema, NodeMatcher, NodeSchema, RelProperties, ID, LASTUPDATED, SUB_RESOURCE_ID,
    SUB_RESOURCE_LABEL,
};

/// Deduplicating, order-preserving collection of index statements.
#[derive(Default)]
struct IndexSet(Vec<IndexStatement>);

impl IndexSet {
    fn push(&mut self, statement: IndexStatement) {
        if !self.0.contains(&statement) {
            self.0.push(statement);
        }
    }

    fn node(&mut self, label: &str, property: &str) {
        self.push(IndexStatement::Node {
            label: label.to_string(),
            property: property.to_string(),
        });
    }

    fn matcher(&mut self, label: &str, matcher: &NodeMatcher) {
        for (field, _) in matcher.iter() {
            self.node(label, field);
        }
    }

    fn rel_extra(&mut self, rel_type: &str, properties: &RelProperties) {
        for (key, _) in properties.iter().filter(|(_, p)| p.extra_index()) {
            self.push(IndexStatement::Relationship {
                rel_type: rel_type.to_string(),
                properties: vec![key.to_string()],
            });
        }
    }

    fn render(self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

/// Indexes backing a node schema's MERGE, matchers and cleanup.
pub fn build_create_index_queries(schema: &NodeSchema) -> Vec<String> {
    let mut indexes = IndexSet::default();
    indexes.node(schema.label(), ID);
    indexes.node(schema.label(), LASTUPDATED);
    for (key, _) in schema.properties().iter().filter(|(_, p)| p.extra_index()) {
        indexes.node(schema.label(), key);
    }
    for rel in schema.relationships() {
        indexes.matcher(rel.target_label(), rel.target_matcher());
        indexes.rel_extra(rel.rel_label(), rel.properties());
    }
    indexes.render()
}

/// Indexes for a matchlink: both matchers plus the scoped staleness lookup.
pub fn build_create_index_queries_for_matchlink(schema: &MatchlinkSchema) -> Vec<String> {
    let rel = schema.relationship();
    let mut indexes = IndexSet::default();
    indexes.matcher(schema.source_label(), schema.source_matcher());
    indexes.matcher(rel.target_label(), rel.target_matcher());
    indexes.push(IndexStatement::Relationship {
        rel_type: rel.rel_label().to_string(),
        properties: vec![
            LASTUPDATED.to_string(),
            SUB_RESOURCE_LABEL.to_string(),
            SUB_RESOURCE_ID.to_string(),
        ],
    });
    indexes.rel_extra(rel.rel_label(), rel.properties());
    indexes.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Direction, NodeProperties, PropertyRef, RelationshipSchema};

    fn rel_props() -> RelProperties {
        RelProperties::new().with(LASTUPDATED, PropertyRef::param(LASTUPDATED))
    }

    #[test]
    fn test_node_indexes() {
        let sub = RelationshipSchema::builder("RESOURCE", Direction::Inward)
            .target("AWSAccount", NodeMatcher::new().with("id", PropertyRef::param("AWS_ID")))
            .properties(rel_props())
            .build()
            .unwrap();
        let other = RelationshipSchema::builder("ATTACHED_TO", Direction::Outward)
            .target("EC2Instance", NodeMatcher::new().with("id", PropertyRef::row("InstanceId")))
            .properties(rel_props().with("device", PropertyRef::row("Device").with_extra_index()))
            .build()
            .unwrap();
        let schema = NodeSchema::builder(
            "EBSVolume",
            NodeProperties::new()
                .with(ID, PropertyRef::row("VolumeId"))
                .with(LASTUPDATED, PropertyRef::param(LASTUPDATED))
                .with("arn", PropertyRef::row("Arn").with_extra_index()),
        )
        .sub_resource(sub)
        .other_relationship(other)
        .build()
        .unwrap();

        assert_eq!(
            build_create_index_queries(&schema),
            vec![
                "CREATE INDEX IF NOT EXISTS FOR (n:EBSVolume) ON (n.id)",
                "CREATE INDEX IF NOT EXISTS FOR (n:EBSVolume) ON (n.lastupdated)",
                "CREATE INDEX IF NOT EXISTS FOR (n:EBSVolume) ON (n.arn)",
                "CREATE INDEX IF NOT EXISTS FOR (n:AWSAccount) ON (n.id)",
                "CREATE INDEX IF NOT EXISTS FOR (n:EC2Instance) ON (n.id)",
                "CREATE INDEX IF NOT EXISTS FOR ()-[r:ATTACHED_TO]-() ON (r.device)",
            ]
        );
    }

    #[test]
    fn test_duplicate_targets_indexed_once() {
        let rel = |label: &str| {
            RelationshipSchema::builder(label, Direction::Outward)
                .target("Tag", NodeMatcher::new().with("id", PropertyRef::row("TagId")))
                .properties(rel_props())
                .build()
                .unwrap()
        };
        let schema = NodeSchema::builder(
            "Tag",
            NodeProperties::new()
                .with(ID, PropertyRef::row("TagId"))
                .with(LASTUPDATED, PropertyRef::param(LASTUPDATED)),
        )
        .other_relationship(rel("PARENT_OF"))
        .other_relationship(rel("CHILD_OF"))
        .build()
        .unwrap();
        let indexes = build_create_index_queries(&schema);
        assert_eq!(indexes.len(), 2);
    }
}
