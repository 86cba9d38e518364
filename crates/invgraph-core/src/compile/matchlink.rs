//! Matchlink ingestion and cleanup.

use super::{arrow, firstseen, match_node, property_sets, returning_count, stale, window, DICT_LIST};
use crate::cypher::{Clause, CypherQuery, Expr, NodePattern, Pattern, Predicate, RelPattern, ROW_ALIAS};
use crate::plan::CompiledQuery;
use crate::schema::{MatchlinkSchema, SUB_RESOURCE_ID, SUB_RESOURCE_LABEL};

const SOURCE: &str = "src";
const TARGET: &str = "tgt";
const REL: &str = "r";

/// Compile the matchlink upsert. Both endpoints must already exist; rows whose
/// source or target is missing produce no relationship.
pub fn build_matchlink_query(schema: &MatchlinkSchema) -> CompiledQuery {
    let rel = schema.relationship();
    let (source, source_predicates) = match_node(SOURCE, schema.source_label(), schema.source_matcher());
    let (target, target_predicates) = match_node(TARGET, rel.target_label(), rel.target_matcher());

    CypherQuery::new(vec![
        Clause::Unwind {
            list: Expr::param(DICT_LIST),
            alias: ROW_ALIAS.to_string(),
        },
        Clause::matching(Pattern::node(source), source_predicates),
        Clause::matching(Pattern::node(target), target_predicates),
        Clause::Merge {
            pattern: Pattern::node(NodePattern::var(SOURCE)).hop(
                RelPattern::new(Some(REL), rel.rel_label(), arrow(rel.direction())),
                NodePattern::var(TARGET),
            ),
            on_create: vec![firstseen(REL)],
        },
        Clause::Set(property_sets(REL, rel.properties().iter())),
    ])
    .into()
}

/// Compile the scoped matchlink cleanup: stale links of this type whose scope
/// markers name the current sub-resource.
pub fn build_matchlink_cleanup_query(schema: &MatchlinkSchema) -> CompiledQuery {
    let rel = schema.relationship();
    let pattern = Pattern::node(NodePattern::anonymous().label(schema.source_label())).hop(
        RelPattern::new(Some(REL), rel.rel_label(), arrow(rel.direction())),
        NodePattern::anonymous().label(rel.target_label()),
    );
    let predicates = vec![
        stale(REL),
        Predicate::Eq(Expr::prop(REL, SUB_RESOURCE_LABEL), Expr::param(SUB_RESOURCE_LABEL)),
        Predicate::Eq(Expr::prop(REL, SUB_RESOURCE_ID), Expr::param(SUB_RESOURCE_ID)),
    ];
    CypherQuery::new(vec![
        Clause::matching(pattern, predicates),
        window(REL),
        Clause::Delete {
            detach: false,
            var: REL.to_string(),
        },
        returning_count(),
    ])
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Direction, NodeMatcher, PropertyRef, RelProperties, RelationshipSchema, LASTUPDATED};

    fn can_access(direction: Direction) -> MatchlinkSchema {
        let rel = RelationshipSchema::builder("CAN_ACCESS", direction)
            .source(
                "AWSPrincipal",
                NodeMatcher::new().with("principal_arn", PropertyRef::row("principal_arn")),
            )
            .target("S3Bucket", NodeMatcher::new().with("name", PropertyRef::row("BucketName")))
            .properties(
                RelProperties::new()
                    .with(LASTUPDATED, PropertyRef::param(LASTUPDATED))
                    .with(SUB_RESOURCE_LABEL, PropertyRef::param(SUB_RESOURCE_LABEL))
                    .with(SUB_RESOURCE_ID, PropertyRef::param(SUB_RESOURCE_ID))
                    .with("permission", PropertyRef::row("permission")),
            )
            .build()
            .unwrap();
        MatchlinkSchema::new(rel).unwrap()
    }

    #[test]
    fn test_matchlink_query() {
        let query = build_matchlink_query(&can_access(Direction::Outward));
        let expected = "\
UNWIND $DictList AS item
MATCH (src:AWSPrincipal {principal_arn: item.principal_arn})
MATCH (tgt:S3Bucket {name: item.BucketName})
MERGE (src)-[r:CAN_ACCESS]->(tgt)
ON CREATE SET r.firstseen = timestamp()
SET
    r.lastupdated = $lastupdated,
    r._sub_resource_label = $_sub_resource_label,
    r._sub_resource_id = $_sub_resource_id,
    r.permission = item.permission";
        assert_eq!(query.text(), expected);
        assert!(!query.text().contains("OPTIONAL"));
        let caller: Vec<&str> = query.caller_parameters().collect();
        assert_eq!(caller, vec!["_sub_resource_id", "_sub_resource_label", "lastupdated"]);
    }

    #[test]
    fn test_inward_matchlink_direction() {
        let query = build_matchlink_query(&can_access(Direction::Inward));
        assert!(query.text().contains("MERGE (src)<-[r:CAN_ACCESS]-(tgt)"));
        let cleanup = build_matchlink_cleanup_query(&can_access(Direction::Inward));
        assert!(cleanup.text().starts_with("MATCH (:AWSPrincipal)<-[r:CAN_ACCESS]-(:S3Bucket)"));
    }

    #[test]
    fn test_matchlink_cleanup_is_scoped() {
        let query = build_matchlink_cleanup_query(&can_access(Direction::Outward));
        assert_eq!(
            query.text(),
            "MATCH (:AWSPrincipal)-[r:CAN_ACCESS]->(:S3Bucket)\n\
             WHERE r.lastupdated <> $UPDATE_TAG AND r._sub_resource_label = $_sub_resource_label \
             AND r._sub_resource_id = $_sub_resource_id\n\
             WITH r LIMIT $LIMIT_SIZE\n\
             DELETE r\n\
             RETURN count(*) AS TotalCompleted"
        );
        let caller: Vec<&str> = query.caller_parameters().collect();
        assert_eq!(caller, vec!["UPDATE_TAG", "_sub_resource_id", "_sub_resource_label"]);
    }
}
