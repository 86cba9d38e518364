//! Relationship schemas.

use serde::Deserialize;

use super::container::{NodeMatcher, RelProperties};
use super::LASTUPDATED;
use crate::error::{SchemaError, SchemaResult};

/// Which way the relationship arrow points, seen from the owning node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// `(owner)<-[:REL]-(other)`
    Inward,
    /// `(owner)-[:REL]->(other)`
    Outward,
}

/// Source side of a matchlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceNode {
    pub label: String,
    pub matcher: NodeMatcher,
}

/// A relationship type: its label, direction, target node and properties.
///
/// When used as a matchlink it also carries a [`SourceNode`]; see
/// [`MatchlinkSchema`](super::MatchlinkSchema).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipSchema {
    rel_label: String,
    direction: Direction,
    target_label: String,
    target_matcher: NodeMatcher,
    properties: RelProperties,
    source: Option<SourceNode>,
}

impl RelationshipSchema {
    pub fn builder(rel_label: impl Into<String>, direction: Direction) -> RelationshipSchemaBuilder {
        RelationshipSchemaBuilder {
            rel_label: rel_label.into(),
            direction,
            target: None,
            properties: RelProperties::new(),
            source: None,
        }
    }

    pub fn rel_label(&self) -> &str {
        &self.rel_label
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn target_label(&self) -> &str {
        &self.target_label
    }

    pub fn target_matcher(&self) -> &NodeMatcher {
        &self.target_matcher
    }

    pub fn properties(&self) -> &RelProperties {
        &self.properties
    }

    pub fn source(&self) -> Option<&SourceNode> {
        self.source.as_ref()
    }

    pub(crate) fn describe(&self) -> String {
        format!("Relationship '{}'", self.rel_label)
    }
}

/// Builder for [`RelationshipSchema`].
#[derive(Debug, Clone)]
pub struct RelationshipSchemaBuilder {
    rel_label: String,
    direction: Direction,
    target: Option<(String, NodeMatcher)>,
    properties: RelProperties,
    source: Option<SourceNode>,
}

impl RelationshipSchemaBuilder {
    pub fn target(mut self, label: impl Into<String>, matcher: NodeMatcher) -> Self {
        self.target = Some((label.into(), matcher));
        self
    }

    pub fn properties(mut self, properties: RelProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn source(mut self, label: impl Into<String>, matcher: NodeMatcher) -> Self {
        self.source = Some(SourceNode {
            label: label.into(),
            matcher,
        });
        self
    }

    pub fn build(self) -> SchemaResult<RelationshipSchema> {
        if self.rel_label.is_empty() {
            return Err(SchemaError::EmptyName("relationship label"));
        }
        let owner = format!("Relationship '{}'", self.rel_label);

        let (target_label, target_matcher) = self.target.ok_or_else(|| SchemaError::MissingTarget {
            rel_label: self.rel_label.clone(),
        })?;
        if target_label.is_empty() {
            return Err(SchemaError::EmptyName("target label"));
        }
        target_matcher.validate(&owner)?;

        if let Some(source) = &self.source {
            if source.label.is_empty() {
                return Err(SchemaError::EmptyName("source label"));
            }
            source.matcher.validate(&owner)?;
        }

        self.properties.check_unique(&owner)?;
        if !self.properties.contains(LASTUPDATED) {
            return Err(SchemaError::missing(owner, LASTUPDATED));
        }

        Ok(RelationshipSchema {
            rel_label: self.rel_label,
            direction: self.direction,
            target_label,
            target_matcher,
            properties: self.properties,
            source: self.source,
        })
    }
}
