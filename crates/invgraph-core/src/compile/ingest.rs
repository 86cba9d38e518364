//! Upsert queries for node schemas.

use super::{arrow, firstseen, match_node, property_sets, DICT_LIST};
use crate::cypher::{Clause, CypherQuery, Expr, NodePattern, Pattern, Predicate, RelPattern, SetItem, ROW_ALIAS};
use crate::plan::CompiledQuery;
use crate::schema::{NodeSchema, RelationshipSchema, ID};

const NODE: &str = "i";
const TARGET: &str = "j";
const REL: &str = "r";

/// Compile the batched upsert for a node schema.
///
/// Each row MERGEs the node on `id`, then attaches every relationship whose
/// target exists. Relationships are `UNION` branches of one `CALL` subquery so a
/// missing target for one never blocks the others.
pub fn build_ingestion_query(schema: &NodeSchema) -> CompiledQuery {
    let mut query = CypherQuery::default();
    query.push(Clause::Unwind {
        list: Expr::param(DICT_LIST),
        alias: ROW_ALIAS.to_string(),
    });

    let mut node = NodePattern::var(NODE).label(schema.label());
    if let Some(id) = schema.properties().get(ID) {
        node = node.property(ID, id.expr());
    }
    query.push(Clause::Merge {
        pattern: Pattern::node(node),
        on_create: vec![firstseen(NODE)],
    });
    query.push(Clause::Set(property_sets(
        NODE,
        schema.properties().iter().filter(|(key, _)| *key != ID),
    )));
    if !schema.extra_labels().is_empty() {
        query.push(Clause::Set(vec![SetItem::labels(NODE, schema.extra_labels())]));
    }

    let branches: Vec<Vec<Clause>> = schema.relationships().map(attach_relationship).collect();
    if !branches.is_empty() {
        query.push(Clause::with(&[NODE, ROW_ALIAS]));
        query.push(Clause::Call(branches));
    }

    query.into()
}

fn attach_relationship(rel: &RelationshipSchema) -> Vec<Clause> {
    let (target, predicates) = match_node(TARGET, rel.target_label(), rel.target_matcher());
    vec![
        Clause::with(&[NODE, ROW_ALIAS]),
        Clause::optional_matching(Pattern::node(target), predicates),
        Clause::With {
            vars: vec![NODE.to_string(), ROW_ALIAS.to_string(), TARGET.to_string()],
            predicates: vec![Predicate::IsNotNull(Expr::var(TARGET))],
            limit: None,
        },
        Clause::Merge {
            pattern: Pattern::node(NodePattern::var(NODE)).hop(
                RelPattern::new(Some(REL), rel.rel_label(), arrow(rel.direction())),
                NodePattern::var(TARGET),
            ),
            on_create: vec![firstseen(REL)],
        },
        Clause::Set(property_sets(REL, rel.properties().iter())),
    ]
}
