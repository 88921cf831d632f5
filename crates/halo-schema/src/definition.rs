//! # Schema Definitions
//!
//! Schemas described as data. A [`SchemaDefinition`] is loaded from YAML or
//! JSON with serde and compiled into a [`Schema`] through the same builder
//! used by code-declared schemas.
//!
//! ```yaml
//! attrs:
//!   - name: id
//!     type: { kind: integer, validators: [{ kind: range, min: 1 }] }
//!   - name: tags
//!     type: { kind: list, items: { kind: string } }
//!   - name: self
//!     compartment: _links
//!     constant: { href: "/items" }
//! ```
//!
//! ## Compile-time Checks
//!
//! [`SchemaDefinition::build`] rejects definitions that could never behave
//! sensibly at runtime: duplicate attribute names, validator bounds with
//! `min > max`, and attributes that declare both a constant and a path.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::attr::Attr;
use crate::schema::Schema;
use crate::types::{Any, DateTime, List, Scalar, ScalarKind, TypeRef};
use crate::validators::{Length, Range, ValidatorRef};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error loading or compiling a schema definition.
#[derive(Error, Debug)]
pub enum DefinitionError {
    /// The YAML text could not be parsed into a definition.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The JSON text could not be parsed into a definition.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two attributes at the same level share a name.
    #[error("duplicate attribute '{name}'")]
    DuplicateAttr {
        /// The repeated name.
        name: String,
    },

    /// A validator's lower bound exceeds its upper bound.
    #[error("attribute '{attr}': {validator} bounds are inverted (min {min} > max {max})")]
    InvalidBounds {
        /// Attribute the validator belongs to.
        attr: String,
        /// Validator kind.
        validator: &'static str,
        /// Declared lower bound.
        min: f64,
        /// Declared upper bound.
        max: f64,
    },

    /// An attribute declares both a constant value and a source path.
    #[error("attribute '{attr}' declares both a constant and a path")]
    ConflictingSource {
        /// The offending attribute.
        attr: String,
    },
}

// ---------------------------------------------------------------------------
// Definition Types
// ---------------------------------------------------------------------------

/// A schema as data: an ordered list of attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Attributes in declaration order.
    #[serde(default)]
    pub attrs: Vec<AttrDefinition>,
}

/// One attribute of a [`SchemaDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrDefinition {
    /// Attribute name.
    pub name: String,
    /// Dot path on the host; defaults to the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Whether the attribute must be present.
    #[serde(default = "default_required")]
    pub required: bool,
    /// Value substituted when the source value is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Document compartment; top level when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compartment: Option<String>,
    /// Document key; the name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Fixed value emitted regardless of the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<Value>,
    /// Conversion type.
    #[serde(default, rename = "type")]
    pub type_def: TypeDefinition,
    /// Exclude from deserialization.
    #[serde(default)]
    pub write_only: bool,
}

fn default_required() -> bool {
    true
}

/// A conversion type, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDefinition {
    /// Identity conversion.
    Any {
        #[serde(default)]
        validators: Vec<ValidatorDefinition>,
    },
    /// String scalar.
    String {
        #[serde(default)]
        validators: Vec<ValidatorDefinition>,
    },
    /// Integer scalar.
    Integer {
        #[serde(default)]
        validators: Vec<ValidatorDefinition>,
    },
    /// Numeric scalar.
    Number {
        #[serde(default)]
        validators: Vec<ValidatorDefinition>,
    },
    /// Boolean scalar.
    Boolean {
        #[serde(default)]
        validators: Vec<ValidatorDefinition>,
    },
    /// RFC 3339 timestamp.
    Datetime {
        #[serde(default)]
        validators: Vec<ValidatorDefinition>,
    },
    /// Homogeneous list.
    List {
        items: Box<TypeDefinition>,
        #[serde(default)]
        validators: Vec<ValidatorDefinition>,
    },
    /// Nested schema.
    Schema {
        #[serde(default)]
        attrs: Vec<AttrDefinition>,
    },
}

impl Default for TypeDefinition {
    fn default() -> Self {
        Self::Any {
            validators: Vec::new(),
        }
    }
}

/// A validator, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidatorDefinition {
    /// Length bounds.
    Length {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
    },
    /// Numeric bounds.
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
}

// ---------------------------------------------------------------------------
// Loading and Compilation
// ---------------------------------------------------------------------------

impl SchemaDefinition {
    /// Parse a definition from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, DefinitionError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse a definition from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Compile into a [`Schema`].
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAttr`, `InvalidBounds`, or `ConflictingSource` for
    /// the first offending attribute, at any nesting depth.
    pub fn build(&self) -> Result<Schema, DefinitionError> {
        let schema = build_attrs(&self.attrs)?;
        tracing::debug!(attrs = schema.len(), "schema definition compiled");
        Ok(schema)
    }
}

fn build_attrs(defs: &[AttrDefinition]) -> Result<Schema, DefinitionError> {
    let mut seen = HashSet::new();
    let mut builder = Schema::builder();

    for def in defs {
        if !seen.insert(def.name.as_str()) {
            return Err(DefinitionError::DuplicateAttr {
                name: def.name.clone(),
            });
        }
        builder = builder.attr(&def.name, def.to_attr()?);
    }

    Ok(builder.build())
}

impl AttrDefinition {
    fn to_attr(&self) -> Result<Attr, DefinitionError> {
        let mut attr = match (&self.constant, &self.path) {
            (Some(_), Some(_)) => {
                return Err(DefinitionError::ConflictingSource {
                    attr: self.name.clone(),
                })
            }
            (Some(constant), None) => Attr::literal(constant.clone()),
            (None, path) => {
                let attr = Attr::with_type_ref(self.type_def.to_type(&self.name)?);
                match path {
                    Some(path) => attr.path(path),
                    None => attr,
                }
            }
        };

        attr = attr.required(self.required);
        if let Some(default) = &self.default {
            attr = attr.default_value(default.clone());
        }
        if let Some(compartment) = &self.compartment {
            attr = attr.compartment(compartment.as_str());
        }
        if let Some(key) = &self.key {
            attr = attr.key(key.as_str());
        }
        if self.write_only {
            attr = attr.write_only();
        }
        Ok(attr)
    }
}

impl TypeDefinition {
    fn to_type(&self, attr: &str) -> Result<TypeRef, DefinitionError> {
        let type_ref: TypeRef = match self {
            Self::Any { validators } => {
                Arc::new(Any::new().with_validators(build_validators(attr, validators)?))
            }
            Self::String { validators } => scalar(ScalarKind::String, attr, validators)?,
            Self::Integer { validators } => scalar(ScalarKind::Integer, attr, validators)?,
            Self::Number { validators } => scalar(ScalarKind::Number, attr, validators)?,
            Self::Boolean { validators } => scalar(ScalarKind::Boolean, attr, validators)?,
            Self::Datetime { validators } => {
                Arc::new(DateTime::new().with_validators(build_validators(attr, validators)?))
            }
            Self::List { items, validators } => Arc::new(
                List::of(items.to_type(attr)?)
                    .with_validators(build_validators(attr, validators)?),
            ),
            Self::Schema { attrs } => Arc::new(build_attrs(attrs)?),
        };
        Ok(type_ref)
    }
}

fn scalar(
    kind: ScalarKind,
    attr: &str,
    validators: &[ValidatorDefinition],
) -> Result<TypeRef, DefinitionError> {
    Ok(Arc::new(
        Scalar::new(kind).with_validators(build_validators(attr, validators)?),
    ))
}

fn build_validators(
    attr: &str,
    defs: &[ValidatorDefinition],
) -> Result<Vec<ValidatorRef>, DefinitionError> {
    defs.iter().map(|def| def.to_validator(attr)).collect()
}

impl ValidatorDefinition {
    fn to_validator(&self, attr: &str) -> Result<ValidatorRef, DefinitionError> {
        match *self {
            Self::Length { min, max } => {
                if let (Some(min), Some(max)) = (min, max) {
                    if min > max {
                        return Err(DefinitionError::InvalidBounds {
                            attr: attr.to_string(),
                            validator: "length",
                            min: min as f64,
                            max: max as f64,
                        });
                    }
                }
                Ok(Arc::new(Length::new(min, max)))
            }
            Self::Range { min, max } => {
                if let (Some(min), Some(max)) = (min, max) {
                    if min > max {
                        return Err(DefinitionError::InvalidBounds {
                            attr: attr.to_string(),
                            validator: "range",
                            min,
                            max,
                        });
                    }
                }
                Ok(Arc::new(Range::new(min, max)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_core::SchemaError;
    use serde_json::json;

    const CATALOG_YAML: &str = r#"
attrs:
  - name: id
    type: { kind: integer, validators: [{ kind: range, min: 1 }] }
  - name: title
    path: meta.title
    required: false
    default: "untitled"
  - name: tags
    type:
      kind: list
      items: { kind: string }
      validators: [{ kind: length, max: 2 }]
  - name: self
    compartment: _links
    constant: { href: "/items" }
"#;

    #[test]
    fn test_parse_yaml_defaults() {
        let def = SchemaDefinition::from_yaml_str(CATALOG_YAML).unwrap();
        assert_eq!(def.attrs.len(), 4);
        assert!(def.attrs[0].required);
        assert!(!def.attrs[1].required);
        assert_eq!(def.attrs[1].default, Some(json!("untitled")));
        assert_eq!(def.attrs[1].type_def, TypeDefinition::default());
        assert!(!def.attrs[3].write_only);
    }

    #[test]
    fn test_build_and_serialize() {
        let schema = SchemaDefinition::from_yaml_str(CATALOG_YAML)
            .unwrap()
            .build()
            .unwrap();
        let doc = schema
            .serialize(&json!({"id": 7, "meta": {"title": "Dune"}, "tags": ["sf"]}))
            .unwrap();
        assert_eq!(
            doc,
            json!({"id": 7, "title": "Dune", "tags": ["sf"], "_links": {"self": {"href": "/items"}}})
        );
    }

    #[test]
    fn test_build_and_deserialize_aggregates() {
        let schema = SchemaDefinition::from_yaml_str(CATALOG_YAML)
            .unwrap()
            .build()
            .unwrap();
        let err = schema
            .deserialize(&json!({"id": 0, "tags": ["a", "b", "c"]}))
            .unwrap_err();
        match err {
            SchemaError::Validation(e) => assert_eq!(
                e.to_value(),
                json!({"errors": {
                    "id": ["Value is less than minimum value '1'."],
                    "tags": ["Length is greater than 2"]
                }})
            ),
            other => panic!("Expected Validation, got: {other}"),
        }
    }

    #[test]
    fn test_parse_json() {
        let def = SchemaDefinition::from_json_str(
            r#"{"attrs": [{"name": "when", "type": {"kind": "datetime"}}]}"#,
        )
        .unwrap();
        let schema = def.build().unwrap();
        let values = schema
            .deserialize(&json!({"when": "2026-01-15T17:00:00+05:00"}))
            .unwrap();
        assert_eq!(values["when"], json!("2026-01-15T12:00:00Z"));
    }

    #[test]
    fn test_nested_schema_definition() {
        let def = SchemaDefinition::from_yaml_str(
            r#"
attrs:
  - name: author
    type:
      kind: schema
      attrs:
        - name: name
          type: { kind: string }
"#,
        )
        .unwrap();
        let schema = def.build().unwrap();
        let err = schema.deserialize(&json!({"author": {"name": 5}})).unwrap_err();
        match err {
            SchemaError::Validation(e) => assert_eq!(
                e.to_value(),
                json!({"errors": {"author": [{"errors": {"name": ["Value is not a string."]}}]}})
            ),
            other => panic!("Expected Validation, got: {other}"),
        }
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let def = SchemaDefinition::from_yaml_str("attrs: [{name: a}, {name: a}]").unwrap();
        match def.build() {
            Err(DefinitionError::DuplicateAttr { name }) => assert_eq!(name, "a"),
            other => panic!("Expected DuplicateAttr, got: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let def = SchemaDefinition::from_yaml_str(
            "attrs: [{name: n, type: {kind: number, validators: [{kind: range, min: 5, max: 1}]}}]",
        )
        .unwrap();
        assert!(matches!(
            def.build(),
            Err(DefinitionError::InvalidBounds { validator: "range", .. })
        ));

        let def = SchemaDefinition::from_yaml_str(
            "attrs: [{name: s, type: {kind: string, validators: [{kind: length, min: 3, max: 2}]}}]",
        )
        .unwrap();
        assert!(matches!(
            def.build(),
            Err(DefinitionError::InvalidBounds { validator: "length", .. })
        ));
    }

    #[test]
    fn test_rejects_constant_with_path() {
        let def =
            SchemaDefinition::from_yaml_str("attrs: [{name: c, path: x, constant: 1}]").unwrap();
        assert!(matches!(
            def.build(),
            Err(DefinitionError::ConflictingSource { ref attr }) if attr == "c"
        ));
    }

    #[test]
    fn test_unknown_kind_is_parse_error() {
        let err = SchemaDefinition::from_yaml_str("attrs: [{name: a, type: {kind: blob}}]")
            .unwrap_err();
        assert!(matches!(err, DefinitionError::Yaml(_)));
    }
}
