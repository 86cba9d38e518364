//! Schema definition files.
//!
//! A definition is a TOML document describing either a node schema or a
//! matchlink. It uses the flag vocabulary of property references
//! (`set_in_kwargs`, `one_to_many`, ...) and is validated into the typed model
//! by [`SchemaDefinition::build`].
//!
//! ```toml
//! kind = "node"
//! label = "EC2Instance"
//!
//! [[properties]]
//! name = "id"
//! ref = "InstanceId"
//!
//! [[properties]]
//! name = "lastupdated"
//! set_in_kwargs = true
//!
//! [sub_resource]
//! label = "RESOURCE"
//! direction = "inward"
//! target = "AWSAccount"
//! matcher = [{ name = "id", ref = "AWS_ID", set_in_kwargs = true }]
//! properties = [{ name = "lastupdated", set_in_kwargs = true }]
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::{
    Direction, MatchlinkSchema, NodeMatcher, NodeSchema, PropertyMap, PropertyRef, RelationshipSchema,
    RelationshipSchemaBuilder,
};

/// One property, matcher field or relationship property.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDefinition {
    /// Graph property (or matcher field) name.
    pub name: String,
    /// Row key or parameter name to read; defaults to `name`.
    #[serde(rename = "ref")]
    pub source: Option<String>,
    #[serde(default)]
    pub set_in_kwargs: bool,
    #[serde(default)]
    pub extra_index: bool,
    #[serde(default)]
    pub ignore_case: bool,
    #[serde(default)]
    pub fuzzy_and_ignore_case: bool,
    #[serde(default)]
    pub one_to_many: bool,
}

impl PropertyDefinition {
    pub fn to_ref(&self) -> SchemaResult<PropertyRef> {
        let flags = [
            ("ignore_case", self.ignore_case),
            ("fuzzy_and_ignore_case", self.fuzzy_and_ignore_case),
            ("one_to_many", self.one_to_many),
        ];
        let mut set = flags.iter().filter(|(_, on)| *on).map(|(flag, _)| *flag);
        if let (Some(first), Some(second)) = (set.next(), set.next()) {
            return Err(SchemaError::ConflictingMatchFlags {
                property: self.name.clone(),
                first,
                second,
            });
        }

        let source = self.source.clone().unwrap_or_else(|| self.name.clone());
        let mut prop = if self.set_in_kwargs {
            PropertyRef::param(source)
        } else {
            PropertyRef::row(source)
        };
        if self.extra_index {
            prop = prop.with_extra_index();
        }
        if self.ignore_case {
            prop = prop.ignore_case();
        } else if self.fuzzy_and_ignore_case {
            prop = prop.fuzzy_and_ignore_case();
        } else if self.one_to_many {
            prop = prop.one_to_many();
        }
        Ok(prop)
    }
}

fn property_map(defs: &[PropertyDefinition]) -> SchemaResult<PropertyMap> {
    defs.iter().map(|d| d.to_ref().map(|p| (d.name.clone(), p))).collect()
}

fn matcher(defs: &[PropertyDefinition]) -> SchemaResult<NodeMatcher> {
    defs.iter().map(|d| d.to_ref().map(|p| (d.name.clone(), p))).collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipDefinition {
    /// Relationship type.
    pub label: String,
    pub direction: Direction,
    /// Target node label.
    pub target: String,
    pub matcher: Vec<PropertyDefinition>,
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
    /// Source node label; matchlinks only.
    pub source: Option<String>,
    #[serde(default)]
    pub source_matcher: Vec<PropertyDefinition>,
}

impl RelationshipDefinition {
    /// Build a relationship written alongside a node; it may not name a source.
    pub fn build(&self) -> SchemaResult<RelationshipSchema> {
        if self.source.is_some() || !self.source_matcher.is_empty() {
            return Err(SchemaError::UnexpectedSource {
                rel_label: self.label.clone(),
            });
        }
        self.builder()?.build()
    }

    /// Build a matchlink between two existing nodes.
    pub fn build_matchlink(&self) -> SchemaResult<MatchlinkSchema> {
        let mut builder = self.builder()?;
        if let Some(source) = &self.source {
            builder = builder.source(source, matcher(&self.source_matcher)?);
        }
        MatchlinkSchema::new(builder.build()?)
    }

    fn builder(&self) -> SchemaResult<RelationshipSchemaBuilder> {
        Ok(RelationshipSchema::builder(&self.label, self.direction)
            .target(&self.target, matcher(&self.matcher)?)
            .properties(property_map(&self.properties)?))
    }
}

fn default_scoped_cleanup() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeDefinition {
    pub label: String,
    #[serde(default)]
    pub extra_labels: Vec<String>,
    pub properties: Vec<PropertyDefinition>,
    pub sub_resource: Option<RelationshipDefinition>,
    #[serde(default)]
    pub other_relationships: Vec<RelationshipDefinition>,
    #[serde(default = "default_scoped_cleanup")]
    pub scoped_cleanup: bool,
}

impl NodeDefinition {
    pub fn build(&self) -> SchemaResult<NodeSchema> {
        let mut builder =
            NodeSchema::builder(&self.label, property_map(&self.properties)?).scoped_cleanup(self.scoped_cleanup);
        for label in &self.extra_labels {
            builder = builder.extra_label(label);
        }
        if let Some(sub) = &self.sub_resource {
            builder = builder.sub_resource(sub.build()?);
        }
        for rel in &self.other_relationships {
            builder = builder.other_relationship(rel.build()?);
        }
        builder.build()
    }
}

/// A parsed, not yet validated, definition file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SchemaDefinition {
    Node(NodeDefinition),
    Matchlink(RelationshipDefinition),
}

impl SchemaDefinition {
    pub fn from_toml_str(content: &str) -> SchemaResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn build(&self) -> SchemaResult<Schema> {
        match self {
            SchemaDefinition::Node(def) => Ok(Schema::Node(def.build()?)),
            SchemaDefinition::Matchlink(def) => Ok(Schema::Matchlink(def.build_matchlink()?)),
        }
    }
}

/// A validated schema of either kind.
#[derive(Debug, Clone)]
pub enum Schema {
    Node(NodeSchema),
    Matchlink(MatchlinkSchema),
}

impl Schema {
    /// Node label or relationship type.
    pub fn label(&self) -> &str {
        match self {
            Schema::Node(schema) => schema.label(),
            Schema::Matchlink(schema) => schema.rel_label(),
        }
    }
}

/// Read, parse and validate a definition file.
pub fn load(path: impl AsRef<Path>) -> SchemaResult<Schema> {
    let content = std::fs::read_to_string(path)?;
    SchemaDefinition::from_toml_str(&content)?.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Binding, CleanupScope, MatchMode};

    const NODE: &str = r#"
kind = "node"
label = "EC2Instance"
extra_labels = ["ComputeResource"]

[[properties]]
name = "id"
ref = "InstanceId"

[[properties]]
name = "lastupdated"
set_in_kwargs = true

[[properties]]
name = "arn"
ref = "Arn"
extra_index = true

[sub_resource]
label = "RESOURCE"
direction = "inward"
target = "AWSAccount"
matcher = [{ name = "id", ref = "AWS_ID", set_in_kwargs = true }]
properties = [{ name = "lastupdated", set_in_kwargs = true }]

[[other_relationships]]
label = "MEMBER_OF"
direction = "outward"
target = "SecurityGroup"
matcher = [{ name = "id", ref = "GroupIds", one_to_many = true }]
properties = [{ name = "lastupdated", set_in_kwargs = true }]
"#;

    const MATCHLINK: &str = r#"
kind = "matchlink"
label = "CAN_ACCESS"
direction = "outward"
source = "AWSPrincipal"
source_matcher = [{ name = "principal_arn" }]
target = "S3Bucket"
matcher = [{ name = "name", ref = "BucketName" }]
properties = [
    { name = "lastupdated", set_in_kwargs = true },
    { name = "_sub_resource_label", set_in_kwargs = true },
    { name = "_sub_resource_id", set_in_kwargs = true },
    { name = "permission" },
]
"#;

    #[test]
    fn test_node_definition() {
        let schema = match SchemaDefinition::from_toml_str(NODE).unwrap().build().unwrap() {
            Schema::Node(schema) => schema,
            other => panic!("expected node schema, got {other:?}"),
        };
        assert_eq!(schema.label(), "EC2Instance");
        assert_eq!(schema.extra_labels(), ["ComputeResource".to_string()]);
        assert!(matches!(schema.cleanup_scope(), CleanupScope::SubResource(_)));
        let id = schema.properties().get("id").unwrap();
        assert_eq!(id.name(), "InstanceId");
        assert_eq!(id.binding(), Binding::Row);
        assert!(schema.properties().get("arn").unwrap().extra_index());

        let group = &schema.other_relationships()[0];
        let (_, field) = group.target_matcher().iter().next().unwrap();
        assert_eq!(field.match_mode(), MatchMode::OneToMany);
    }

    #[test]
    fn test_matchlink_definition() {
        let schema = SchemaDefinition::from_toml_str(MATCHLINK).unwrap().build().unwrap();
        assert_eq!(schema.label(), "CAN_ACCESS");
        let Schema::Matchlink(link) = schema else {
            panic!("expected matchlink");
        };
        assert_eq!(link.source_label(), "AWSPrincipal");
        let (field, prop) = link.source_matcher().iter().next().unwrap();
        assert_eq!((field, prop.name()), ("principal_arn", "principal_arn"));
    }

    #[test]
    fn test_conflicting_flags_rejected() {
        let def = PropertyDefinition {
            name: "email".into(),
            source: None,
            set_in_kwargs: false,
            extra_index: false,
            ignore_case: true,
            fuzzy_and_ignore_case: true,
            one_to_many: false,
        };
        assert!(matches!(
            def.to_ref(),
            Err(SchemaError::ConflictingMatchFlags { first: "ignore_case", second: "fuzzy_and_ignore_case", .. })
        ));

        let def = PropertyDefinition {
            ignore_case: false,
            one_to_many: true,
            ..def
        };
        assert!(matches!(def.to_ref(), Err(SchemaError::ConflictingMatchFlags { .. })));
    }

    #[test]
    fn test_unscoped_sub_resource_definition_rejected() {
        let text = NODE.replace("kind = \"node\"", "kind = \"node\"\nscoped_cleanup = false");
        let err = SchemaDefinition::from_toml_str(&text).unwrap().build().unwrap_err();
        assert!(matches!(err, SchemaError::UnscopedSubResource { .. }));
    }

    #[test]
    fn test_matchlink_without_source_rejected() {
        let text = MATCHLINK.replace("source = \"AWSPrincipal\"\n", "");
        let err = SchemaDefinition::from_toml_str(&text).unwrap().build().unwrap_err();
        assert!(matches!(err, SchemaError::MissingSource { .. }));
    }

    #[test]
    fn test_source_outside_matchlink_rejected() {
        let text = NODE.replace(
            "target = \"SecurityGroup\"\n",
            "target = \"SecurityGroup\"\nsource = \"EC2Instance\"\n",
        );
        let err = SchemaDefinition::from_toml_str(&text).unwrap().build().unwrap_err();
        assert!(matches!(err, SchemaError::UnexpectedSource { rel_label } if rel_label == "MEMBER_OF"));

        let text = NODE.replace(
            "target = \"AWSAccount\"\n",
            "target = \"AWSAccount\"\nsource_matcher = [{ name = \"id\" }]\n",
        );
        let err = SchemaDefinition::from_toml_str(&text).unwrap().build().unwrap_err();
        assert!(matches!(err, SchemaError::UnexpectedSource { rel_label } if rel_label == "RESOURCE"));
    }

    #[test]
    fn test_unknown_kind_is_toml_error() {
        let err = SchemaDefinition::from_toml_str("kind = \"edge\"\nlabel = \"X\"").unwrap_err();
        assert!(matches!(err, SchemaError::Toml(_)));
    }

    #[test]
    fn test_demo_definitions_build() {
        let node = SchemaDefinition::from_toml_str(include_str!("../../../demos/ec2_instance.toml"))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(node.label(), "EC2Instance");
        let link = SchemaDefinition::from_toml_str(include_str!("../../../demos/can_access.toml"))
            .unwrap()
            .build()
            .unwrap();
        assert!(matches!(link, Schema::Matchlink(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load("/nonexistent/schema.toml").unwrap_err();
        assert!(matches!(err, SchemaError::Io(_)));
    }
}
