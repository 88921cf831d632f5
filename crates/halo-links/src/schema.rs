//! # HAL Schemas
//!
//! [`HalSchemaBuilder`] composes plain attributes, links, and embedded
//! resources into a [`HalSchema`]. When any link or embedded resource
//! carries a curie, the built schema ends with an optional `curies` link
//! list in `_links` advertising each distinct curie once.
//!
//! A HAL schema is a Type, so it nests like any other schema, and it can
//! be extended by a derived HAL schema: base attributes come first and the
//! base's curies are kept.

use std::sync::Arc;

use serde_json::{Map, Value};

use halo_core::{FieldHost, SchemaError, ValidationError};
use halo_schema::{Attr, List, Schema, SchemaBuilder, Type};

use crate::curie::Curie;
use crate::embedded::Embedded;
use crate::link::Link;
use crate::{CURIES, LINKS};

/// Builder for [`HalSchema`].
#[derive(Debug, Clone, Default)]
pub struct HalSchemaBuilder {
    inner: SchemaBuilder,
    curies: Vec<Curie>,
}

impl HalSchemaBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inherit the attributes and curies of `base`.
    pub fn extend(mut self, base: &HalSchema) -> Self {
        self.inner = self.inner.extend(&base.schema);
        for curie in &base.curies {
            self.add_curie(curie);
        }
        self
    }

    /// Declare a plain attribute.
    pub fn attr(mut self, name: &str, attr: Attr) -> Self {
        self.inner = self.inner.attr(name, attr);
        self
    }

    /// Declare a link.
    pub fn link(mut self, name: &str, link: Link) -> Self {
        if let Some(curie) = link.curie_ref() {
            self.add_curie(curie);
        }
        self.inner = self.inner.attr(name, link.into_attr());
        self
    }

    /// Declare an embedded resource.
    pub fn embedded(mut self, name: &str, embedded: Embedded) -> Self {
        if let Some(curie) = embedded.curie_ref() {
            self.add_curie(curie);
        }
        self.inner = self.inner.attr(name, embedded.into_attr());
        self
    }

    /// Finish the schema, appending the `curies` link list when needed.
    pub fn build(self) -> HalSchema {
        let mut inner = self.inner;
        if !self.curies.is_empty() {
            tracing::debug!(curies = self.curies.len(), "curies link appended");
            inner = inner.attr(CURIES, curies_attr(&self.curies));
        }
        HalSchema {
            schema: inner.build(),
            curies: self.curies,
        }
    }

    fn add_curie(&mut self, curie: &Curie) {
        if !self.curies.contains(curie) {
            self.curies.push(curie.clone());
        }
    }
}

/// Link list rendering each curie as `{href, name, templated?, type?}`.
fn curies_attr(curies: &[Curie]) -> Attr {
    let item = Schema::builder()
        .attr("href", Attr::new())
        .attr("name", Attr::new())
        .attr("templated", Attr::new().optional())
        .attr("type", Attr::new().optional())
        .build();
    let source = Value::Array(curies.iter().map(Curie::to_value).collect());

    Attr::with_type_ref(Arc::new(List::new(item)))
        .getter_fn(move |_| Ok(source.clone()))
        .optional()
        .compartment(LINKS)
        .write_only()
}

/// A schema following the HAL document conventions.
#[derive(Debug, Clone, Default)]
pub struct HalSchema {
    schema: Schema,
    curies: Vec<Curie>,
}

impl HalSchema {
    /// Start declaring a HAL schema.
    pub fn builder() -> HalSchemaBuilder {
        HalSchemaBuilder::new()
    }

    /// The compiled attribute schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Distinct curies in first-use order, base schemas first.
    pub fn curies(&self) -> &[Curie] {
        &self.curies
    }

    /// Serialize `host` into a HAL document.
    ///
    /// # Errors
    ///
    /// See [`Schema::serialize`].
    pub fn serialize(&self, host: &dyn FieldHost) -> Result<Value, SchemaError> {
        self.schema.serialize(host)
    }

    /// Deserialize a HAL document; links are skipped.
    ///
    /// # Errors
    ///
    /// See [`Schema::deserialize`].
    pub fn deserialize(&self, document: &Value) -> Result<Map<String, Value>, SchemaError> {
        self.schema.deserialize(document)
    }

    /// Deserialize a HAL document into `output`.
    ///
    /// # Errors
    ///
    /// See [`Schema::deserialize_into`].
    pub fn deserialize_into(
        &self,
        document: &Value,
        output: &mut dyn FieldHost,
    ) -> Result<(), SchemaError> {
        self.schema.deserialize_into(document, output)
    }
}

impl Type for HalSchema {
    fn serialize(&self, value: &Value) -> Result<Value, SchemaError> {
        Type::serialize(&self.schema, value)
    }

    fn deserialize(&self, value: &Value) -> Result<Value, ValidationError> {
        Type::deserialize(&self.schema, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn acme() -> Curie {
        Curie::new("acme", "/rels/{rel}").templated(true)
    }

    #[test]
    fn test_no_curies_no_curies_link() {
        let schema = HalSchema::builder()
            .attr("id", Attr::new())
            .link("self", Link::new().path("url"))
            .build();
        assert!(schema.curies().is_empty());
        assert!(schema.schema().attr(CURIES).is_none());
    }

    #[test]
    fn test_distinct_curies_appended_last() {
        let schema = HalSchema::builder()
            .link("orders", Link::new().curie(acme()))
            .link("customers", Link::new().curie(acme()))
            .embedded("owner", Embedded::default().optional().curie(acme()))
            .build();
        assert_eq!(schema.curies(), &[acme()]);
        let last = schema.schema().attrs().last().map(Attr::name);
        assert_eq!(last, Some(CURIES));

        let doc = schema
            .serialize(&json!({"orders": "/orders", "customers": "/customers"}))
            .unwrap();
        assert_eq!(
            doc["_links"]["curies"],
            json!([{"href": "/rels/{rel}", "name": "acme", "templated": true}])
        );
    }

    #[test]
    fn test_extend_keeps_base_curies() {
        let base = HalSchema::builder()
            .link("orders", Link::new().curie(acme()))
            .build();
        let other = Curie::new("ext", "/ext/{rel}");
        let derived = HalSchema::builder()
            .extend(&base)
            .link("shipments", Link::new().curie(other.clone()))
            .build();
        assert_eq!(derived.curies(), &[acme(), other]);
        let curies_count = derived
            .schema()
            .attrs()
            .iter()
            .filter(|a| a.name() == CURIES)
            .count();
        assert_eq!(curies_count, 1);
    }
}
