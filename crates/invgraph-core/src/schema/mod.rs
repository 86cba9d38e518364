//! Declarative schema model.
//!
//! Schemas describe node and relationship types and where each property's value
//! comes from. They are built once, validated at build time, and then shared
//! read-only by the query compilers.

mod container;
mod matchlink;
mod node;
mod property;
mod relationship;

pub use container::{
    NodeMatcher, NodeProperties, PropertyMap, RelProperties, SourceNodeMatcher, TargetNodeMatcher,
};
pub use matchlink::MatchlinkSchema;
pub use node::{CleanupScope, NodeSchema, NodeSchemaBuilder};
pub use property::{Binding, MatchMode, PropertyRef};
pub use relationship::{Direction, RelationshipSchema, RelationshipSchemaBuilder, SourceNode};

/// Identity property every node is merged on.
pub const ID: &str = "id";

/// Staleness marker carried by every node and relationship.
pub const LASTUPDATED: &str = "lastupdated";

/// Set once, when the element is first created.
pub const FIRSTSEEN: &str = "firstseen";

/// Scope marker: label of the sub-resource that owns a matchlink.
pub const SUB_RESOURCE_LABEL: &str = "_sub_resource_label";

/// Scope marker: id of the sub-resource that owns a matchlink.
pub const SUB_RESOURCE_ID: &str = "_sub_resource_id";
