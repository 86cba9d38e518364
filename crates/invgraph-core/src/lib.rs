//! invgraph core library
//!
//! Declarative node and relationship schemas, and the compilers that turn them
//! into idempotent Cypher: batched MERGE ingestion, index creation, and
//! scoped staleness cleanup. Nothing here talks to a database.

pub mod compile;
pub mod cypher;
pub mod definition;
pub mod error;
pub mod plan;
pub mod schema;

pub use compile::{
    build_cleanup_queries, build_create_index_queries, build_create_index_queries_for_matchlink,
    build_ingestion_query, build_matchlink_cleanup_query, build_matchlink_query,
};
pub use definition::{Schema, SchemaDefinition};
pub use error::{SchemaError, SchemaResult};
pub use plan::{CompiledQuery, MatchlinkPlan, QueryPlan};
pub use schema::{
    CleanupScope, Direction, MatchlinkSchema, NodeMatcher, NodeProperties, NodeSchema, PropertyRef, RelProperties,
    RelationshipSchema,
};
