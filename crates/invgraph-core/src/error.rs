//! Schema configuration errors.
//!
//! Every variant describes a schema that cannot produce a correct ingestion or
//! cleanup query. They are raised while a schema is built and are never retried.

use thiserror::Error;

/// Error raised while building or loading a schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Node '{label}' has a sub-resource relationship but scoped_cleanup is false")]
    UnscopedSubResource { label: String },

    #[error("Sub-resource matcher field '{field}' on node '{label}' must be set_in_kwargs")]
    RowScopedSubResourceMatcher { label: String, field: String },

    #[error("Sub-resource matcher field '{field}' on node '{label}' must match exactly, not {mode}")]
    NonExactSubResourceMatcher {
        label: String,
        field: String,
        mode: &'static str,
    },

    #[error("Relationship '{rel_label}' declares a source node; only matchlinks have one")]
    UnexpectedSource { rel_label: String },

    #[error("Property '{property}' cannot combine {first} with {second}")]
    ConflictingMatchFlags {
        property: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("{owner} is missing required property '{property}'")]
    MissingProperty { owner: String, property: String },

    #[error("{owner} property '{property}' must be set_in_kwargs")]
    PropertyNotParameter { owner: String, property: String },

    #[error("{owner} scope marker '{property}' must read the run parameter of the same name")]
    ScopeMarkerBinding { owner: String, property: &'static str },

    #[error("{owner} declares property '{property}' more than once")]
    DuplicateProperty { owner: String, property: String },

    #[error("{owner} has an empty node matcher")]
    EmptyMatcher { owner: String },

    #[error("Relationship '{rel_label}' has no target node")]
    MissingTarget { rel_label: String },

    #[error("Relationship '{rel_label}' has no source node; matchlinks need a source label and matcher")]
    MissingSource { rel_label: String },

    #[error("Empty {0} name")]
    EmptyName(&'static str),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

impl SchemaError {
    pub(crate) fn missing(owner: impl Into<String>, property: impl Into<String>) -> Self {
        Self::MissingProperty {
            owner: owner.into(),
            property: property.into(),
        }
    }
}
