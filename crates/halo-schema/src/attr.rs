//! # Attributes
//!
//! An [`Attr`] binds a conversion to an [`Accessor`] under a name. It owns
//! the required/optional/default policy and names the compartment of the
//! document it lives in (`None` for the top level).
//!
//! ## Lifecycle
//!
//! An attribute's name is assigned exactly once, when the owning schema is
//! built: either the name it was declared under, or an explicit name set
//! beforehand with [`Attr::named`]. An attribute without an explicit
//! accessor reads and writes the path equal to its name.
//!
//! ## Constants
//!
//! An attribute whose type slot is [`AttrType::Literal`] always serializes
//! to that constant without touching the host, and never deserializes.

use std::sync::Arc;

use serde_json::Value;

use halo_core::{AccessError, Accessor, FieldHost, SchemaError, ValidationError};

use crate::types::{Any, Type, TypeRef};

/// What an attribute converts with.
#[derive(Debug, Clone)]
pub enum AttrType {
    /// Read through the accessor and convert with a Type.
    Converter(TypeRef),
    /// Emit a fixed value.
    Literal(Value),
}

/// How an attribute derives its key within its compartment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrKey {
    /// The attribute name.
    Name,
    /// A fixed key.
    Fixed(String),
    /// `<prefix>:<name>`.
    Namespaced(String),
}

/// A named schema attribute.
#[derive(Debug, Clone)]
pub struct Attr {
    name: Option<String>,
    attr_type: AttrType,
    accessor: Option<Accessor>,
    required: bool,
    default: Option<Value>,
    compartment: Option<String>,
    key: AttrKey,
    deserializable: bool,
}

impl Default for Attr {
    fn default() -> Self {
        Self::new()
    }
}

impl Attr {
    /// A required attribute with identity conversion.
    pub fn new() -> Self {
        Self::with_type_ref(Arc::new(Any::new()))
    }

    /// A required attribute converted by `attr_type`.
    pub fn typed(attr_type: impl Type + 'static) -> Self {
        Self::with_type_ref(Arc::new(attr_type))
    }

    /// A required attribute converted by a shared type.
    pub fn with_type_ref(attr_type: TypeRef) -> Self {
        Self {
            name: None,
            attr_type: AttrType::Converter(attr_type),
            accessor: None,
            required: true,
            default: None,
            compartment: None,
            key: AttrKey::Name,
            deserializable: true,
        }
    }

    /// An attribute that always serializes to `value`.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self {
            attr_type: AttrType::Literal(value.into()),
            ..Self::new()
        }
    }

    /// Set the name explicitly; the schema will not overwrite it.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Read and write along a dot path instead of the name.
    pub fn path(self, path: &str) -> Self {
        self.accessor(Accessor::path(path))
    }

    /// Compute the value from the host; the attribute becomes read-only on
    /// the host side.
    pub fn getter_fn<F>(self, getter: F) -> Self
    where
        F: Fn(&dyn FieldHost) -> Result<Value, AccessError> + Send + Sync + 'static,
    {
        self.accessor(Accessor::from_fn(getter))
    }

    /// Use an explicit accessor.
    pub fn accessor(mut self, accessor: Accessor) -> Self {
        self.accessor = Some(accessor);
        self
    }

    /// Set whether the attribute must be present.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Shorthand for `required(false)`.
    pub fn optional(self) -> Self {
        self.required(false)
    }

    /// Value substituted when the source value is missing.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Place the attribute in a named sub-mapping of the document.
    pub fn compartment(mut self, compartment: impl Into<String>) -> Self {
        self.compartment = Some(compartment.into());
        self
    }

    /// Use a fixed key instead of the name.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = AttrKey::Fixed(key.into());
        self
    }

    /// Key the attribute as `<prefix>:<name>`.
    pub fn namespaced(mut self, prefix: impl Into<String>) -> Self {
        self.key = AttrKey::Namespaced(prefix.into());
        self
    }

    /// Exclude the attribute from deserialization.
    pub fn write_only(mut self) -> Self {
        self.deserializable = false;
        self
    }

    /// Assign the declared name unless one is already set, and default the
    /// accessor to the name's path.
    pub(crate) fn bind(mut self, declared: &str) -> Self {
        let name = self.name.get_or_insert_with(|| declared.to_string());
        if self.accessor.is_none() {
            self.accessor = Some(Accessor::path(name));
        }
        self
    }

    /// The attribute name, empty until bound by a schema.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// The key within the compartment.
    pub fn key_name(&self) -> String {
        match &self.key {
            AttrKey::Name => self.name().to_string(),
            AttrKey::Fixed(key) => key.clone(),
            AttrKey::Namespaced(prefix) => format!("{prefix}:{}", self.name()),
        }
    }

    /// The compartment, `None` for the top level.
    pub fn compartment_name(&self) -> Option<&str> {
        self.compartment.as_deref()
    }

    /// The conversion slot.
    pub fn attr_type(&self) -> &AttrType {
        &self.attr_type
    }

    /// The accessor, set once the attribute is bound.
    pub fn accessor_ref(&self) -> Option<&Accessor> {
        self.accessor.as_ref()
    }

    /// Whether the attribute must be present.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The value substituted for a missing source value.
    pub fn fallback(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether the attribute takes part in deserialization.
    pub fn is_deserializable(&self) -> bool {
        self.deserializable && matches!(self.attr_type, AttrType::Converter(_))
    }

    /// Pull the value out of `host` and convert it.
    ///
    /// A missing source value is replaced by the default when one is
    /// configured; otherwise the lookup error is returned so the schema can
    /// decide based on `required`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Access` for accessor failures and any error
    /// raised by the Type.
    pub fn serialize(&self, host: &dyn FieldHost) -> Result<Value, SchemaError> {
        let attr_type = match &self.attr_type {
            AttrType::Literal(value) => return Ok(value.clone()),
            AttrType::Converter(attr_type) => attr_type,
        };

        let accessor = self.accessor.as_ref().ok_or(AccessError::MissingGetter)?;
        let value = match accessor.get(host) {
            Ok(value) => value,
            Err(e) if e.is_lookup() => match &self.default {
                Some(default) => default.clone(),
                None => return Err(e.into()),
            },
            Err(e) => return Err(e.into()),
        };

        attr_type.serialize(&value)
    }

    /// Locate the value in the attribute's compartment of `document` and
    /// convert it.
    ///
    /// An absent key falls back to the default, which is converted like a
    /// document value. Returns `Ok(None)` when the key is absent and the
    /// attribute is optional without a default. A missing compartment is treated as an
    /// empty one.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Unsupported` for constant and write-only
    /// attributes, and `SchemaError::Validation` (tagged with the key) when
    /// the value is missing but required or fails conversion.
    pub fn deserialize(&self, document: &Value) -> Result<Option<Value>, SchemaError> {
        let attr_type = match &self.attr_type {
            AttrType::Converter(attr_type) if self.deserializable => attr_type,
            _ => {
                return Err(SchemaError::Unsupported {
                    attr: self.name().to_string(),
                })
            }
        };

        let key = self.key_name();
        let compartment = match &self.compartment {
            None => Some(document),
            Some(name) => document.get(name),
        };

        let value = match (compartment.and_then(|c| c.get(&key)), &self.default) {
            (Some(value), _) | (None, Some(value)) => value,
            (None, None) if self.required => return Err(ValidationError::missing(key).into()),
            (None, None) => return Ok(None),
        };

        attr_type
            .deserialize(value)
            .map(Some)
            .map_err(|e| e.tagged(key).into())
    }

    /// Write a deserialized value into `output` through the accessor.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::MissingSetter` when the accessor cannot write.
    pub fn assign(&self, output: &mut dyn FieldHost, value: Value) -> Result<Value, SchemaError> {
        let accessor = self.accessor.as_ref().ok_or(AccessError::MissingSetter)?;
        Ok(accessor.set(output, value)?)
    }
}
