//! Staleness cleanup for node schemas.
//!
//! Every statement deletes at most `$LIMIT_SIZE` elements whose `lastupdated`
//! differs from `$UPDATE_TAG` and reports how many it removed, so the caller
//! can repeat it in short transactions until nothing stale is left.

use super::{arrow, match_node, returning_count, stale, window};
use crate::cypher::{Clause, CypherQuery, NodePattern, Pattern, Predicate, RelPattern};
use crate::plan::CompiledQuery;
use crate::schema::{CleanupScope, NodeSchema, RelationshipSchema};

const NODE: &str = "n";
const OWNER: &str = "owner";
const SUB_REL: &str = "s";
const REL: &str = "r";

/// Compile the cleanup statements for a node schema, in execution order.
///
/// With a sub-resource, stale nodes go first, then stale sub-resource links, then
/// stale other relationships, all restricted to the current owner. Without one,
/// scoped cleanup touches relationships only and unscoped cleanup sweeps the
/// whole label.
pub fn build_cleanup_queries(schema: &NodeSchema) -> Vec<CompiledQuery> {
    let others = schema.other_relationships().iter();
    match schema.cleanup_scope() {
        CleanupScope::SubResource(sub) => {
            let mut queries = vec![stale_scoped_nodes(schema, sub), stale_sub_resource_links(schema, sub)];
            queries.extend(others.map(|rel| stale_relationships(schema, rel, Some(sub))));
            queries
        }
        CleanupScope::RelationshipsOnly => others.map(|rel| stale_relationships(schema, rel, None)).collect(),
        CleanupScope::Unscoped => std::iter::once(stale_nodes(schema))
            .chain(others.map(|rel| stale_relationships(schema, rel, None)))
            .collect(),
    }
}

/// `(n:Label)<-[s:SUB_REL]-(owner:Owner {id: $OWNER_ID})` and any matcher predicates.
fn scope(schema: &NodeSchema, sub: &RelationshipSchema, rel_var: Option<&str>) -> (Pattern, Vec<Predicate>) {
    let (owner, predicates) = match_node(OWNER, sub.target_label(), sub.target_matcher());
    let pattern = Pattern::node(NodePattern::var(NODE).label(schema.label()))
        .hop(RelPattern::new(rel_var, sub.rel_label(), arrow(sub.direction())), owner);
    (pattern, predicates)
}

fn stale_scoped_nodes(schema: &NodeSchema, sub: &RelationshipSchema) -> CompiledQuery {
    let (pattern, scope_predicates) = scope(schema, sub, None);
    let mut predicates = vec![stale(NODE)];
    predicates.extend(scope_predicates);
    delete_nodes(Clause::matching(pattern, predicates))
}

fn stale_nodes(schema: &NodeSchema) -> CompiledQuery {
    let pattern = Pattern::node(NodePattern::var(NODE).label(schema.label()));
    delete_nodes(Clause::matching(pattern, vec![stale(NODE)]))
}

fn delete_nodes(matching: Clause) -> CompiledQuery {
    CypherQuery::new(vec![
        matching,
        window(NODE),
        Clause::Delete {
            detach: true,
            var: NODE.to_string(),
        },
        returning_count(),
    ])
    .into()
}

fn stale_sub_resource_links(schema: &NodeSchema, sub: &RelationshipSchema) -> CompiledQuery {
    let (pattern, scope_predicates) = scope(schema, sub, Some(SUB_REL));
    let mut predicates = vec![stale(SUB_REL)];
    predicates.extend(scope_predicates);
    delete_relationships(vec![Clause::matching(pattern, predicates)], SUB_REL)
}

/// Stale links of one relationship type; `scope_rel` restricts the owning nodes.
fn stale_relationships(
    schema: &NodeSchema,
    rel: &RelationshipSchema,
    scope_rel: Option<&RelationshipSchema>,
) -> CompiledQuery {
    let mut clauses = Vec::new();
    let owner_node = match scope_rel {
        Some(sub) => {
            let (pattern, predicates) = scope(schema, sub, None);
            clauses.push(Clause::matching(pattern, predicates));
            NodePattern::var(NODE)
        }
        None => NodePattern::var(NODE).label(schema.label()),
    };
    let pattern = Pattern::node(owner_node).hop(
        RelPattern::new(Some(REL), rel.rel_label(), arrow(rel.direction())),
        NodePattern::anonymous().label(rel.target_label()),
    );
    clauses.push(Clause::matching(pattern, vec![stale(REL)]));
    delete_relationships(clauses, REL)
}

fn delete_relationships(mut clauses: Vec<Clause>, var: &str) -> CompiledQuery {
    clauses.push(window(var));
    clauses.push(Clause::Delete {
        detach: false,
        var: var.to_string(),
    });
    clauses.push(returning_count());
    CypherQuery::new(clauses).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Direction, NodeMatcher, NodeProperties, PropertyRef, RelProperties, ID, LASTUPDATED};

    fn rel_props() -> RelProperties {
        RelProperties::new().with(LASTUPDATED, PropertyRef::param(LASTUPDATED))
    }

    fn props() -> NodeProperties {
        NodeProperties::new()
            .with(ID, PropertyRef::row("Id"))
            .with(LASTUPDATED, PropertyRef::param(LASTUPDATED))
    }

    fn account_rel() -> RelationshipSchema {
        RelationshipSchema::builder("RESOURCE", Direction::Inward)
            .target("AWSAccount", NodeMatcher::new().with("id", PropertyRef::param("AWS_ID")))
            .properties(rel_props())
            .build()
            .unwrap()
    }

    fn group_rel() -> RelationshipSchema {
        RelationshipSchema::builder("MEMBER_OF", Direction::Outward)
            .target("SecurityGroup", NodeMatcher::new().with("id", PropertyRef::row("GroupId")))
            .properties(rel_props())
            .build()
            .unwrap()
    }

    fn texts(queries: &[CompiledQuery]) -> Vec<&str> {
        queries.iter().map(CompiledQuery::text).collect()
    }

    #[test]
    fn test_sub_resource_scoped_cleanup() {
        let schema = NodeSchema::builder("EC2Instance", props())
            .sub_resource(account_rel())
            .other_relationship(group_rel())
            .build()
            .unwrap();
        let queries = build_cleanup_queries(&schema);
        assert_eq!(
            texts(&queries),
            vec![
                "MATCH (n:EC2Instance)<-[:RESOURCE]-(owner:AWSAccount {id: $AWS_ID})\n\
                 WHERE n.lastupdated <> $UPDATE_TAG\n\
                 WITH n LIMIT $LIMIT_SIZE\n\
                 DETACH DELETE n\n\
                 RETURN count(*) AS TotalCompleted",
                "MATCH (n:EC2Instance)<-[s:RESOURCE]-(owner:AWSAccount {id: $AWS_ID})\n\
                 WHERE s.lastupdated <> $UPDATE_TAG\n\
                 WITH s LIMIT $LIMIT_SIZE\n\
                 DELETE s\n\
                 RETURN count(*) AS TotalCompleted",
                "MATCH (n:EC2Instance)<-[:RESOURCE]-(owner:AWSAccount {id: $AWS_ID})\n\
                 MATCH (n)-[r:MEMBER_OF]->(:SecurityGroup)\n\
                 WHERE r.lastupdated <> $UPDATE_TAG\n\
                 WITH r LIMIT $LIMIT_SIZE\n\
                 DELETE r\n\
                 RETURN count(*) AS TotalCompleted",
            ]
        );
        for query in &queries {
            let caller: Vec<&str> = query.caller_parameters().collect();
            assert_eq!(caller, vec!["AWS_ID", "UPDATE_TAG"]);
        }
    }

    #[test]
    fn test_relationships_only_cleanup() {
        let schema = NodeSchema::builder("Tag", props())
            .other_relationship(group_rel())
            .build()
            .unwrap();
        let queries = build_cleanup_queries(&schema);
        assert_eq!(queries.len(), 1);
        assert_eq!(
            queries[0].text(),
            "MATCH (n:Tag)-[r:MEMBER_OF]->(:SecurityGroup)\n\
             WHERE r.lastupdated <> $UPDATE_TAG\n\
             WITH r LIMIT $LIMIT_SIZE\n\
             DELETE r\n\
             RETURN count(*) AS TotalCompleted"
        );
        assert!(queries.iter().all(|q| !q.text().contains("DETACH DELETE")));
    }

    #[test]
    fn test_relationships_only_without_relationships_is_empty() {
        let schema = NodeSchema::builder("Tag", props()).build().unwrap();
        assert!(build_cleanup_queries(&schema).is_empty());
    }

    #[test]
    fn test_unscoped_cleanup() {
        let schema = NodeSchema::builder("Tag", props())
            .other_relationship(group_rel())
            .scoped_cleanup(false)
            .build()
            .unwrap();
        let queries = build_cleanup_queries(&schema);
        assert_eq!(
            texts(&queries),
            vec![
                "MATCH (n:Tag)\n\
                 WHERE n.lastupdated <> $UPDATE_TAG\n\
                 WITH n LIMIT $LIMIT_SIZE\n\
                 DETACH DELETE n\n\
                 RETURN count(*) AS TotalCompleted",
                "MATCH (n:Tag)-[r:MEMBER_OF]->(:SecurityGroup)\n\
                 WHERE r.lastupdated <> $UPDATE_TAG\n\
                 WITH r LIMIT $LIMIT_SIZE\n\
                 DELETE r\n\
                 RETURN count(*) AS TotalCompleted",
            ]
        );
        for query in &queries {
            let caller: Vec<&str> = query.caller_parameters().collect();
            assert_eq!(caller, vec!["UPDATE_TAG"]);
        }
    }

    #[test]
    fn test_outward_sub_resource_and_case_insensitive_owner() {
        let sub = RelationshipSchema::builder("OWNED_BY", Direction::Outward)
            .target(
                "Tenant",
                NodeMatcher::new().with("name", PropertyRef::param("TENANT").ignore_case()),
            )
            .properties(rel_props())
            .build()
            .unwrap();
        let schema = NodeSchema::builder("Device", props()).sub_resource(sub).build().unwrap();
        let queries = build_cleanup_queries(&schema);
        assert_eq!(
            queries[0].text(),
            "MATCH (n:Device)-[:OWNED_BY]->(owner:Tenant)\n\
             WHERE n.lastupdated <> $UPDATE_TAG AND toLower(owner.name) = toLower($TENANT)\n\
             WITH n LIMIT $LIMIT_SIZE\n\
             DETACH DELETE n\n\
             RETURN count(*) AS TotalCompleted"
        );
    }
}
