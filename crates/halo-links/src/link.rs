//! # Links
//!
//! A [`Link`] describes one relation in the `_links` compartment. It
//! compiles to a write-only [`Attr`]: links are generated on the way out
//! and never read back.
//!
//! ## Href Sources
//!
//! - [`Link::new`]: the attribute's source value is the href.
//! - [`Link::constant`]: a fixed href; the host is not consulted.
//! - [`Link::typed`]: a Type receives the source value and produces the
//!   whole link object.
//!
//! `templated` and `type` hints are emitted verbatim next to the href.
//! [`Link::list`] turns the relation into a link list, one link object per
//! source item.

use std::sync::Arc;

use serde_json::{Map, Value};

use halo_core::Accessor;
use halo_schema::{Attr, List, Schema, Type, TypeRef};

use crate::curie::Curie;
use crate::LINKS;

#[derive(Debug, Clone)]
enum Href {
    Source,
    Constant(Value),
    Typed(TypeRef),
}

/// A relation placed in `_links`.
#[derive(Debug, Clone)]
pub struct Link {
    href: Href,
    accessor: Option<Accessor>,
    key: Option<String>,
    required: bool,
    curie: Option<Curie>,
    templated: Option<bool>,
    media_type: Option<String>,
    list: bool,
}

impl Default for Link {
    fn default() -> Self {
        Self::new()
    }
}

impl Link {
    fn with_href(href: Href) -> Self {
        Self {
            href,
            accessor: None,
            key: None,
            required: true,
            curie: None,
            templated: None,
            media_type: None,
            list: false,
        }
    }

    /// A required link whose href is the attribute's source value.
    pub fn new() -> Self {
        Self::with_href(Href::Source)
    }

    /// A link with a fixed href.
    pub fn constant(href: impl Into<Value>) -> Self {
        Self::with_href(Href::Constant(href.into()))
    }

    /// A link object produced by `link_type` from the source value.
    pub fn typed(link_type: impl Type + 'static) -> Self {
        Self::with_href(Href::Typed(Arc::new(link_type)))
    }

    /// A link object produced by a shared type.
    pub fn with_type_ref(link_type: TypeRef) -> Self {
        Self::with_href(Href::Typed(link_type))
    }

    /// Read the source value along a dot path instead of the name.
    pub fn path(self, path: &str) -> Self {
        self.accessor(Accessor::path(path))
    }

    /// Use an explicit accessor for the source value.
    pub fn accessor(mut self, accessor: Accessor) -> Self {
        self.accessor = Some(accessor);
        self
    }

    /// Key in `_links`; ignored when a curie is set.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set whether the link must be present.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Shorthand for `required(false)`.
    pub fn optional(self) -> Self {
        self.required(false)
    }

    /// Namespace the relation with `curie`.
    pub fn curie(mut self, curie: Curie) -> Self {
        self.curie = Some(curie);
        self
    }

    /// Emit `templated` with the link.
    pub fn templated(mut self, templated: bool) -> Self {
        self.templated = Some(templated);
        self
    }

    /// Emit a `type` media type hint with the link.
    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Render a list of links, one per source item.
    pub fn list(mut self) -> Self {
        self.list = true;
        self
    }

    /// The curie namespacing this link, if any.
    pub fn curie_ref(&self) -> Option<&Curie> {
        self.curie.as_ref()
    }

    /// Compile into a write-only attribute in `_links`.
    pub fn into_attr(self) -> Attr {
        let mut attr = match &self.href {
            Href::Constant(href) => {
                let object = self.constant_object(href.clone());
                Attr::literal(if self.list {
                    Value::Array(vec![object])
                } else {
                    object
                })
            }
            Href::Source => Attr::with_type_ref(self.wrap(Arc::new(self.link_schema()))),
            Href::Typed(link_type) => Attr::with_type_ref(self.wrap(link_type.clone())),
        };

        if let Some(accessor) = self.accessor {
            attr = attr.accessor(accessor);
        }
        attr = attr.required(self.required).compartment(LINKS).write_only();

        match (self.curie, self.key) {
            (Some(curie), _) => attr.namespaced(curie.name),
            (None, Some(key)) => attr.key(key),
            (None, None) => attr,
        }
    }

    fn wrap(&self, link_type: TypeRef) -> TypeRef {
        if self.list {
            Arc::new(List::of(link_type))
        } else {
            link_type
        }
    }

    /// Schema turning a source value into `{href, templated?, type?}`.
    fn link_schema(&self) -> Schema {
        let mut builder =
            Schema::builder().attr("href", Attr::new().accessor(Accessor::identity()));
        if let Some(templated) = self.templated {
            builder = builder.attr("templated", Attr::literal(templated));
        }
        if let Some(media_type) = &self.media_type {
            builder = builder.attr("type", Attr::literal(media_type.as_str()));
        }
        builder.build()
    }

    fn constant_object(&self, href: Value) -> Value {
        let mut map = Map::new();
        map.insert("href".into(), href);
        if let Some(templated) = self.templated {
            map.insert("templated".into(), Value::Bool(templated));
        }
        if let Some(media_type) = &self.media_type {
            map.insert("type".into(), Value::String(media_type.clone()));
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_core::SchemaError;
    use serde_json::json;

    fn single(name: &str, link: Link) -> Schema {
        Schema::builder().attr(name, link.into_attr()).build()
    }

    #[test]
    fn test_source_href() {
        let schema = single("self", Link::new().path("url"));
        let doc = schema.serialize(&json!({"url": "/orders/7"})).unwrap();
        assert_eq!(doc, json!({"_links": {"self": {"href": "/orders/7"}}}));
    }

    #[test]
    fn test_hints_emitted() {
        let schema = single(
            "search",
            Link::new().templated(true).media_type("application/hal+json"),
        );
        let doc = schema.serialize(&json!({"search": "/orders{?q}"})).unwrap();
        assert_eq!(
            doc,
            json!({"_links": {"search": {
                "href": "/orders{?q}",
                "templated": true,
                "type": "application/hal+json"
            }}})
        );
    }

    #[test]
    fn test_constant_href_ignores_host() {
        let schema = single("help", Link::constant("/docs").key("describedby"));
        let doc = schema.serialize(&json!(null)).unwrap();
        assert_eq!(doc, json!({"_links": {"describedby": {"href": "/docs"}}}));
    }

    #[test]
    fn test_typed_link_object() {
        let link_type = Schema::builder()
            .attr("href", Attr::new().path("url"))
            .attr("title", Attr::new().path("label"))
            .build();
        let schema = single("author", Link::typed(link_type));
        let doc = schema
            .serialize(&json!({"author": {"url": "/people/1", "label": "Ada"}}))
            .unwrap();
        assert_eq!(
            doc,
            json!({"_links": {"author": {"href": "/people/1", "title": "Ada"}}})
        );
    }

    #[test]
    fn test_link_list() {
        let schema = single("items", Link::new().path("item_urls").list());
        let doc = schema
            .serialize(&json!({"item_urls": ["/a", "/b"]}))
            .unwrap();
        assert_eq!(
            doc,
            json!({"_links": {"items": [{"href": "/a"}, {"href": "/b"}]}})
        );
    }

    #[test]
    fn test_curie_namespaces_key_over_explicit_key() {
        let curie = Curie::new("acme", "/rels/{rel}");
        let schema = single("orders", Link::new().key("ignored").curie(curie));
        let doc = schema.serialize(&json!({"orders": "/orders"})).unwrap();
        assert_eq!(doc, json!({"_links": {"acme:orders": {"href": "/orders"}}}));
    }

    #[test]
    fn test_missing_required_link_fails() {
        let schema = single("next", Link::new());
        let err = schema.serialize(&json!({})).unwrap_err();
        assert!(err.is_lookup(), "got: {err}");

        let schema = single("next", Link::new().optional());
        assert_eq!(schema.serialize(&json!({})).unwrap(), json!({"_links": {}}));
    }

    #[test]
    fn test_links_are_write_only() {
        let schema = single("self", Link::new());
        let attr = &schema.attrs()[0];
        assert!(!attr.is_deserializable());
        assert!(matches!(
            attr.deserialize(&json!({"_links": {"self": {"href": "/x"}}})),
            Err(SchemaError::Unsupported { .. })
        ));
        assert!(schema.deserialize(&json!({})).unwrap().is_empty());
    }
}
