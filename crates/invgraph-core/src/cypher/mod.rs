//! Cypher query fragments.

mod ast;
mod escape;

pub use ast::{
    Arrow, Clause, CypherQuery, Expr, IndexStatement, NodePattern, Pattern, Predicate, RelPattern, SetItem,
    ROW_ALIAS,
};
pub use escape::{escape_identifier, Ident};
