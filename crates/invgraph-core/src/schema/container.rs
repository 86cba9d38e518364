//! Ordered property containers and node matchers.

use super::property::PropertyRef;
use crate::error::{SchemaError, SchemaResult};

/// Ordered mapping from a graph property name to the [`PropertyRef`] that feeds it.
///
/// Insertion order is preserved so compiled queries are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    entries: Vec<(String, PropertyRef)>,
}

/// Properties written onto a node.
pub type NodeProperties = PropertyMap;

/// Properties written onto a relationship.
pub type RelProperties = PropertyMap;

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a property. Duplicate names are rejected when the owning schema is built.
    pub fn with(mut self, key: impl Into<String>, property: PropertyRef) -> Self {
        self.entries.push((key.into(), property));
        self
    }

    pub fn get(&self, key: &str) -> Option<&PropertyRef> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, p)| p)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyRef)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn check_unique(&self, owner: &str) -> SchemaResult<()> {
        for (i, (key, _)) in self.entries.iter().enumerate() {
            if key.is_empty() {
                return Err(SchemaError::EmptyName("property"));
            }
            if self.entries[..i].iter().any(|(k, _)| k == key) {
                return Err(SchemaError::DuplicateProperty {
                    owner: owner.to_string(),
                    property: key.clone(),
                });
            }
        }
        Ok(())
    }

    /// Fails unless `key` is present and bound to a run parameter.
    pub(crate) fn require_parameter(&self, owner: &str, key: &str) -> SchemaResult<()> {
        match self.get(key) {
            None => Err(SchemaError::missing(owner, key)),
            Some(p) if !p.is_parameter() => Err(SchemaError::PropertyNotParameter {
                owner: owner.to_string(),
                property: key.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, PropertyRef)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, PropertyRef)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, p)| (k.into(), p)).collect(),
        }
    }
}

/// Fields on the *other* node of a relationship, and where their values come from.
///
/// A matcher must not be empty: an empty matcher would attach to every node of the label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeMatcher {
    fields: PropertyMap,
}

/// Matcher locating the target node of a relationship.
pub type TargetNodeMatcher = NodeMatcher;

/// Matcher locating the source node of a matchlink.
pub type SourceNodeMatcher = NodeMatcher;

impl NodeMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, property: PropertyRef) -> Self {
        self.fields = self.fields.with(field, property);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyRef)> {
        self.fields.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn validate(&self, owner: &str) -> SchemaResult<()> {
        if self.fields.is_empty() {
            return Err(SchemaError::EmptyMatcher {
                owner: owner.to_string(),
            });
        }
        self.fields.check_unique(owner)
    }
}

impl<K: Into<String>> FromIterator<(K, PropertyRef)> for NodeMatcher {
    fn from_iter<I: IntoIterator<Item = (K, PropertyRef)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
