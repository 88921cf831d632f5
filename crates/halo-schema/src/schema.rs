//! # Schemas
//!
//! A [`Schema`] is an ordered collection of named [`Attr`]s. It turns a
//! host object into a compartmented document and a document back into
//! either a mapping of attribute values or writes on an output host.
//!
//! ## Construction
//!
//! Schemas are built once and reused. [`SchemaBuilder`] covers both
//! declaration styles: attributes declared one by one (optionally
//! extending base schemas, whose attributes come first) and attributes
//! supplied as a runtime name→Attr collection ([`Schema::from_attrs`]).
//! Each attribute is bound to its name exactly once at build time.
//!
//! ## Error Policy
//!
//! - `serialize` fails fast: a missing source value for a required
//!   attribute aborts the call; for an optional attribute the field is
//!   omitted.
//! - `deserialize` collects every attribute failure and returns one
//!   aggregate error. Nothing is written to an output host unless every
//!   attribute succeeded.

use serde_json::{Map, Value};

use halo_core::{value_kind, AccessError, Accessor, FieldHost, SchemaError, ValidationError};

use crate::attr::Attr;
use crate::types::Type;

const NOT_A_MAPPING: &str = "Value is not a mapping.";

/// An ordered collection of uniquely named attributes.
///
/// ## Thread Safety
///
/// `Schema` is immutable after construction and `Send + Sync`; one
/// instance can serve any number of concurrent calls. All per-call state
/// lives on the caller's stack.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    attrs: Vec<Attr>,
}

/// Builder collecting attributes in declaration order.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    attrs: Vec<Attr>,
}

impl SchemaBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inherit every attribute of `base`, in its order, ahead of the
    /// attributes declared afterwards.
    pub fn extend(mut self, base: &Schema) -> Self {
        for attr in base.attrs() {
            self.push(attr.clone());
        }
        self
    }

    /// Declare `attr` under `name`. An explicit name set with
    /// [`Attr::named`] wins over `name`. Redeclaring a name replaces the
    /// earlier attribute in place.
    pub fn attr(mut self, name: &str, attr: Attr) -> Self {
        self.push(attr.bind(name));
        self
    }

    /// Declare several attributes in iteration order.
    pub fn attrs<I, K>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, Attr)>,
        K: AsRef<str>,
    {
        for (name, attr) in attrs {
            self.push(attr.bind(name.as_ref()));
        }
        self
    }

    /// Finish the schema.
    pub fn build(self) -> Schema {
        Schema { attrs: self.attrs }
    }

    fn push(&mut self, attr: Attr) {
        match self.attrs.iter_mut().find(|a| a.name() == attr.name()) {
            Some(existing) => *existing = attr,
            None => self.attrs.push(attr),
        }
    }
}

impl Schema {
    /// Start declaring a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Build a schema from a runtime name→Attr collection.
    pub fn from_attrs<I, K>(attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, Attr)>,
        K: AsRef<str>,
    {
        SchemaBuilder::new().attrs(attrs).build()
    }

    /// Attributes in declaration order.
    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    /// Look up an attribute by name.
    pub fn attr(&self, name: &str) -> Option<&Attr> {
        self.attrs.iter().find(|a| a.name() == name)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Returns true if the schema declares no attributes.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Serialize `host` into a document.
    ///
    /// Each attribute's value is placed at its key inside its compartment;
    /// compartments are created on first use and later attributes with the
    /// same compartment and key overwrite earlier ones.
    ///
    /// # Errors
    ///
    /// Returns the first lookup failure of a required attribute, and any
    /// non-lookup failure of any attribute.
    pub fn serialize(&self, host: &dyn FieldHost) -> Result<Value, SchemaError> {
        let mut result = Map::new();

        for attr in &self.attrs {
            let compartment = match attr.compartment_name() {
                None => &mut result,
                Some(name) => {
                    let slot = result
                        .entry(name.to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                    match slot {
                        Value::Object(map) => map,
                        other => {
                            return Err(SchemaError::TypeMismatch {
                                expected: "object",
                                found: value_kind(other),
                            })
                        }
                    }
                }
            };

            match attr.serialize(host) {
                Ok(value) => {
                    compartment.insert(attr.key_name(), value);
                }
                Err(e) if e.is_lookup() && !attr.is_required() => {
                    tracing::debug!(attr = %attr.name(), error = %e, "optional attribute omitted");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Value::Object(result))
    }

    /// Deserialize `document` into a mapping of attribute name to value.
    ///
    /// Attributes that do not support deserialization are skipped.
    /// Attributes without a value are left out of the mapping.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Validation` holding one aggregate error with a
    /// child per failing attribute, tagged with the attribute name.
    pub fn deserialize(&self, document: &Value) -> Result<Map<String, Value>, SchemaError> {
        let mut result = Map::new();
        let mut errors = Vec::new();

        for attr in &self.attrs {
            match attr.deserialize(document) {
                Ok(Some(value)) => {
                    result.insert(attr.name().to_string(), value);
                }
                Ok(None) => {}
                Err(SchemaError::Unsupported { .. }) => {
                    tracing::trace!(attr = %attr.name(), "attribute skipped: deserialization unsupported");
                }
                Err(SchemaError::Validation(e)) => errors.push(e.with_attr(attr.name())),
                Err(e) => return Err(e),
            }
        }

        if !errors.is_empty() {
            tracing::debug!(errors = errors.len(), "deserialization failed validation");
            return Err(ValidationError::aggregate(errors).into());
        }

        Ok(result)
    }

    /// Deserialize `document` and write every produced value into `output`
    /// through the attributes' accessors.
    ///
    /// Writes happen only after the whole document validated and every
    /// attribute that produced a value has a setter.
    ///
    /// # Errors
    ///
    /// Returns the aggregate validation error of [`Schema::deserialize`] or
    /// `AccessError::MissingSetter`, both without touching `output`. A host
    /// that rejects an assignment (`Rejected`, `MemberNotFound`) stops the
    /// writes at that attribute; values assigned before it stay in `output`.
    pub fn deserialize_into(
        &self,
        document: &Value,
        output: &mut dyn FieldHost,
    ) -> Result<(), SchemaError> {
        let mut values = self.deserialize(document)?;

        let writes: Vec<(&Attr, Value)> = self
            .attrs
            .iter()
            .filter_map(|attr| values.remove(attr.name()).map(|value| (attr, value)))
            .collect();
        if writes
            .iter()
            .any(|(attr, _)| attr.accessor_ref().and_then(Accessor::setter).is_none())
        {
            return Err(AccessError::MissingSetter.into());
        }

        for (attr, value) in writes {
            attr.assign(output, value)?;
        }
        Ok(())
    }
}

/// A schema converts nested objects, so it can be the type of another
/// schema's attribute. Null passes through; any other non-mapping value is
/// rejected as a whole.
impl Type for Schema {
    fn serialize(&self, value: &Value) -> Result<Value, SchemaError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        Schema::serialize(self, value)
    }

    fn deserialize(&self, value: &Value) -> Result<Value, ValidationError> {
        match value {
            Value::Null => return Ok(Value::Null),
            Value::Object(_) => {}
            _ => return Err(ValidationError::new(NOT_A_MAPPING)),
        }
        match Schema::deserialize(self, value) {
            Ok(map) => Ok(Value::Object(map)),
            Err(SchemaError::Validation(e)) => Err(e),
            Err(other) => Err(ValidationError::new(other.to_string())),
        }
    }
}
