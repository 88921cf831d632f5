//! # CURIEs
//!
//! A compact URI prefix. Links and embedded resources that carry a curie
//! are keyed `<curie name>:<attr name>`, and a HAL schema advertises every
//! curie it uses in a `curies` link list.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named documentation link used to namespace relation names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Curie {
    /// Prefix used in namespaced keys.
    pub name: String,
    /// Documentation href, usually templated with `{rel}`.
    pub href: String,
    /// Whether `href` is a URI template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templated: Option<bool>,
    /// Media type hint for the documentation resource.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl Curie {
    /// A curie without optional hints.
    pub fn new(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
            templated: None,
            media_type: None,
        }
    }

    /// Mark the href as templated (or explicitly not).
    pub fn templated(mut self, templated: bool) -> Self {
        self.templated = Some(templated);
        self
    }

    /// Attach a media type hint.
    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// The curie as a host value for the `curies` link schema.
    pub(crate) fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("name".into(), Value::String(self.name.clone()));
        map.insert("href".into(), Value::String(self.href.clone()));
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
    use serde_json::json;

    #[test]
    fn test_to_value_omits_unset_hints() {
        let curie = Curie::new("acme", "https://docs.acme.test/rels/{rel}");
        assert_eq!(
            curie.to_value(),
            json!({"name": "acme", "href": "https://docs.acme.test/rels/{rel}"})
        );
    }

    #[test]
    fn test_serde_uses_type_key() {
        let curie = Curie::new("acme", "/rels/{rel}")
            .templated(true)
            .media_type("text/html");
        let value = serde_json::to_value(&curie).unwrap();
        assert_eq!(value, curie.to_value());
        let back: Curie = serde_json::from_value(value).unwrap();
        assert_eq!(back, curie);
    }
}
