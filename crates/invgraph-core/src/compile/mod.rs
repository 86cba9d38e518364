//! Query compilers.
//!
//! Every function here is a pure mapping from a schema to Cypher text. Nothing
//! is cached at this level; see [`QueryPlan`](crate::plan::QueryPlan) for the
//! per-schema memoized form.

mod cleanup;
mod index;
mod ingest;
mod matchlink;

pub use cleanup::build_cleanup_queries;
pub use index::{build_create_index_queries, build_create_index_queries_for_matchlink};
pub use ingest::build_ingestion_query;
pub use matchlink::{build_matchlink_cleanup_query, build_matchlink_query};

use crate::cypher::{Arrow, Clause, Expr, NodePattern, Predicate, SetItem};
use crate::schema::{Direction, MatchMode, NodeMatcher, PropertyRef, FIRSTSEEN, LASTUPDATED};

/// Parameter carrying the batch of input rows.
pub const DICT_LIST: &str = "DictList";

/// Parameter carrying the current run id in cleanup statements.
pub const UPDATE_TAG: &str = "UPDATE_TAG";

/// Parameter bounding how many elements one cleanup statement deletes.
pub const LIMIT_SIZE: &str = "LIMIT_SIZE";

/// Column every cleanup statement returns: elements deleted by that window.
pub const TOTAL_COMPLETED: &str = "TotalCompleted";

/// Arrow as seen from the owning node, which is always on the left of the pattern.
fn arrow(direction: Direction) -> Arrow {
    match direction {
        Direction::Inward => Arrow::Incoming,
        Direction::Outward => Arrow::Outgoing,
    }
}

/// Pattern for the node a matcher locates, plus predicates for the fields that
/// cannot be matched in the pattern map.
fn match_node(var: &str, label: &str, matcher: &NodeMatcher) -> (NodePattern, Vec<Predicate>) {
    let mut node = NodePattern::var(var).label(label);
    let mut predicates = Vec::new();
    for (field, prop) in matcher.iter() {
        let field_expr = Expr::prop(var, field);
        match prop.match_mode() {
            MatchMode::Exact => node = node.property(field, prop.expr()),
            MatchMode::OneToMany => predicates.push(Predicate::In(field_expr, prop.expr())),
            MatchMode::IgnoreCase => {
                predicates.push(Predicate::Eq(field_expr.to_lower(), prop.expr().to_lower()))
            }
            MatchMode::Fuzzy => {
                predicates.push(Predicate::Contains(field_expr.to_lower(), prop.expr().to_lower()))
            }
        }
    }
    (node, predicates)
}

fn firstseen(var: &str) -> SetItem {
    SetItem::property(var, FIRSTSEEN, Expr::Timestamp)
}

fn property_sets<'a>(var: &str, props: impl Iterator<Item = (&'a str, &'a PropertyRef)>) -> Vec<SetItem> {
    props.map(|(key, prop)| SetItem::property(var, key, prop.expr())).collect()
}

/// `var.lastupdated <> $UPDATE_TAG`
fn stale(var: &str) -> Predicate {
    Predicate::Ne(Expr::prop(var, LASTUPDATED), Expr::param(UPDATE_TAG))
}

/// `WITH var LIMIT $LIMIT_SIZE`
fn window(var: &str) -> Clause {
    Clause::With {
        vars: vec![var.to_string()],
        predicates: Vec::new(),
        limit: Some(Expr::param(LIMIT_SIZE)),
    }
}

fn returning_count() -> Clause {
    Clause::Return(vec![(Expr::CountAll, TOTAL_COMPLETED.to_string())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PropertyRef;

    #[test]
    fn test_exact_fields_go_in_pattern() {
        let matcher = NodeMatcher::new()
            .with("id", PropertyRef::param("AWS_ID"))
            .with("region", PropertyRef::row("Region"));
        let (node, predicates) = match_node("j", "AWSAccount", &matcher);
        assert_eq!(node.to_string(), "(j:AWSAccount {id: $AWS_ID, region: item.Region})");
        assert!(predicates.is_empty());
    }

    #[test]
    fn test_one_to_many_is_membership() {
        let matcher = NodeMatcher::new().with("id", PropertyRef::row("GroupIds").one_to_many());
        let (node, predicates) = match_node("j", "SecurityGroup", &matcher);
        assert_eq!(node.to_string(), "(j:SecurityGroup)");
        assert_eq!(predicates[0].to_string(), "j.id IN item.GroupIds");
    }

    #[test]
    fn test_case_insensitive_modes() {
        let matcher = NodeMatcher::new()
            .with("email", PropertyRef::row("Email").ignore_case())
            .with("name", PropertyRef::row("Name").fuzzy_and_ignore_case());
        let (_, predicates) = match_node("j", "User", &matcher);
        let rendered: Vec<String> = predicates.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "toLower(j.email) = toLower(item.Email)",
                "toLower(j.name) CONTAINS toLower(item.Name)",
            ]
        );
    }
}
