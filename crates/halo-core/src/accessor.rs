//! # Accessors
//!
//! An [`Accessor`] encapsulates how an attribute value is read out of, and
//! written into, a host object. Each side is either a dot-separated
//! [`AttrPath`] or a function; either side may be absent, and using an
//! absent side fails with `MissingGetter` / `MissingSetter`.
//!
//! ## Path Resolution
//!
//! Reading `a.b.c` asks the host for `a`, then looks up `b` and `c` as
//! keys of the intermediate mappings. Writing `a.b.c` creates an empty
//! mapping at every missing intermediate segment, then assigns `c`.
//! Lookup failures are returned un-wrapped; the caller decides whether a
//! default recovers them.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::AccessError;
use crate::host::{lookup_error, FieldHost};

/// Function reading a value out of a host.
pub type GetterFn = Arc<dyn Fn(&dyn FieldHost) -> Result<Value, AccessError> + Send + Sync>;

/// Function writing a value into a host.
pub type SetterFn = Arc<dyn Fn(&mut dyn FieldHost, Value) -> Result<(), AccessError> + Send + Sync>;

/// A dot-separated sequence of field names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttrPath {
    segments: Vec<String>,
}

impl AttrPath {
    /// Split `path` on `.`.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path.split('.').map(str::to_string).collect(),
        }
    }

    /// The individual field names.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolve the path against `host`.
    pub fn resolve(&self, host: &dyn FieldHost) -> Result<Value, AccessError> {
        let (first, rest) = self.split_first()?;
        let mut current = host
            .get_field(first)
            .ok_or_else(|| lookup_error(host.kind(), first))?;

        for segment in rest {
            current = match current {
                Value::Object(mut map) => {
                    map.remove(segment.as_str())
                        .ok_or_else(|| AccessError::KeyNotFound {
                            key: segment.clone(),
                        })?
                }
                _ => {
                    return Err(AccessError::MemberNotFound {
                        member: segment.clone(),
                    })
                }
            };
        }
        Ok(current)
    }

    /// Assign `value` at the path inside `host`, creating empty mappings
    /// at missing or null intermediate segments.
    pub fn assign(&self, host: &mut dyn FieldHost, value: Value) -> Result<(), AccessError> {
        let (first, rest) = self.split_first()?;
        let Some((last, intermediate)) = rest.split_last() else {
            return host.set_field(first, value);
        };

        let mut root = match host.get_field(first) {
            Some(Value::Object(map)) => Value::Object(map),
            Some(Value::Null) | None => Value::Object(Map::new()),
            Some(_) => {
                return Err(AccessError::NotTraversable {
                    segment: first.clone(),
                })
            }
        };

        let mut cursor = &mut root;
        for segment in intermediate {
            let Value::Object(map) = cursor else {
                return Err(AccessError::NotTraversable {
                    segment: segment.clone(),
                });
            };
            let slot = map
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if slot.is_null() {
                *slot = Value::Object(Map::new());
            }
            cursor = slot;
        }
        let Value::Object(map) = cursor else {
            return Err(AccessError::NotTraversable {
                segment: last.clone(),
            });
        };
        map.insert(last.clone(), value);

        host.set_field(first, root)
    }

    fn split_first(&self) -> Result<(&String, &[String]), AccessError> {
        self.segments
            .split_first()
            .ok_or_else(|| AccessError::KeyNotFound { key: String::new() })
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for AttrPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

/// Read side of an accessor.
#[derive(Clone)]
pub enum Getter {
    /// Resolve a dot path.
    Path(AttrPath),
    /// Call a function with the host.
    Func(GetterFn),
    /// Return the host itself as a document value.
    Identity,
}

/// Write side of an accessor.
#[derive(Clone)]
pub enum Setter {
    /// Assign along a dot path.
    Path(AttrPath),
    /// Call a function with the host and the value.
    Func(SetterFn),
}

impl fmt::Debug for Getter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Getter::Path(path) => write!(f, "'{path}'"),
            Getter::Func(_) => write!(f, "<fn>"),
            Getter::Identity => write!(f, "<self>"),
        }
    }
}

impl fmt::Debug for Setter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setter::Path(path) => write!(f, "'{path}'"),
            Setter::Func(_) => write!(f, "<fn>"),
        }
    }
}

/// Getter and setter of an attribute.
#[derive(Clone, Default)]
pub struct Accessor {
    getter: Option<Getter>,
    setter: Option<Setter>,
}

impl Accessor {
    /// An accessor with neither side configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and write along the same dot path.
    pub fn path(path: &str) -> Self {
        let path = AttrPath::parse(path);
        Self {
            getter: Some(Getter::Path(path.clone())),
            setter: Some(Setter::Path(path)),
        }
    }

    /// A read-only accessor returning the host itself.
    pub fn identity() -> Self {
        Self {
            getter: Some(Getter::Identity),
            setter: None,
        }
    }

    /// A read-only accessor computing the value from the host.
    pub fn from_fn<F>(getter: F) -> Self
    where
        F: Fn(&dyn FieldHost) -> Result<Value, AccessError> + Send + Sync + 'static,
    {
        Self {
            getter: Some(Getter::Func(Arc::new(getter))),
            setter: None,
        }
    }

    /// Replace the getter with a dot path.
    pub fn with_getter(mut self, path: &str) -> Self {
        self.getter = Some(Getter::Path(AttrPath::parse(path)));
        self
    }

    /// Replace the getter with a function.
    pub fn with_getter_fn<F>(mut self, getter: F) -> Self
    where
        F: Fn(&dyn FieldHost) -> Result<Value, AccessError> + Send + Sync + 'static,
    {
        self.getter = Some(Getter::Func(Arc::new(getter)));
        self
    }

    /// Replace the setter with a dot path.
    pub fn with_setter(mut self, path: &str) -> Self {
        self.setter = Some(Setter::Path(AttrPath::parse(path)));
        self
    }

    /// Replace the setter with a function.
    pub fn with_setter_fn<F>(mut self, setter: F) -> Self
    where
        F: Fn(&mut dyn FieldHost, Value) -> Result<(), AccessError> + Send + Sync + 'static,
    {
        self.setter = Some(Setter::Func(Arc::new(setter)));
        self
    }

    /// The configured getter, if any.
    pub fn getter(&self) -> Option<&Getter> {
        self.getter.as_ref()
    }

    /// The configured setter, if any.
    pub fn setter(&self) -> Option<&Setter> {
        self.setter.as_ref()
    }

    /// Read the value out of `host`.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::MissingGetter` if no getter is configured, and
    /// the lookup error of the first missing path segment otherwise.
    pub fn get(&self, host: &dyn FieldHost) -> Result<Value, AccessError> {
        match self.getter.as_ref().ok_or(AccessError::MissingGetter)? {
            Getter::Path(path) => path.resolve(host),
            Getter::Func(getter) => getter(host),
            Getter::Identity => host.to_value(),
        }
    }

    /// Write `value` into `host` and return the assigned value.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::MissingSetter` if no setter is configured.
    pub fn set(&self, host: &mut dyn FieldHost, value: Value) -> Result<Value, AccessError> {
        match self.setter.as_ref().ok_or(AccessError::MissingSetter)? {
            Setter::Path(path) => path.assign(host, value.clone())?,
            Setter::Func(setter) => setter(host, value.clone())?,
        }
        Ok(value)
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("getter", &self.getter)
            .field("setter", &self.setter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostKind, Record};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    struct Person {
        first: String,
        last: String,
    }

    impl FieldHost for Person {
        fn kind(&self) -> HostKind {
            HostKind::Record
        }

        fn get_field(&self, name: &str) -> Option<Value> {
            match name {
                "first" => Some(json!(self.first)),
                "last" => Some(json!(self.last)),
                "full_name" => Some(json!(format!("{} {}", self.first, self.last))),
                _ => None,
            }
        }

        fn set_field(&mut self, name: &str, value: Value) -> Result<(), AccessError> {
            let text = value.as_str().unwrap_or_default().to_string();
            match name {
                "first" => self.first = text,
                "last" => self.last = text,
                _ => {
                    return Err(AccessError::MemberNotFound {
                        member: name.to_string(),
                    })
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_get_nested_path_from_mapping() {
        let doc = json!({"a": {"b": {"c": 7}}});
        assert_eq!(Accessor::path("a.b.c").get(&doc).unwrap(), json!(7));
    }

    #[test]
    fn test_get_missing_key_is_lookup_error() {
        let doc = json!({"a": {"b": 1}});
        let err = Accessor::path("a.x").get(&doc).unwrap_err();
        assert_eq!(err, AccessError::KeyNotFound { key: "x".into() });
        assert!(err.is_lookup());
    }

    #[test]
    fn test_get_missing_member_on_record_host() {
        let person = Person {
            first: "Ada".into(),
            last: "Lovelace".into(),
        };
        let err = Accessor::path("age").get(&person).unwrap_err();
        assert_eq!(err, AccessError::MemberNotFound { member: "age".into() });
    }

    #[test]
    fn test_computed_member_is_resolved() {
        let person = Person {
            first: "Ada".into(),
            last: "Lovelace".into(),
        };
        assert_eq!(
            Accessor::path("full_name").get(&person).unwrap(),
            json!("Ada Lovelace")
        );
    }

    #[test]
    fn test_descending_into_scalar_is_member_error() {
        let doc = json!({"a": 1});
        let err = Accessor::path("a.b").get(&doc).unwrap_err();
        assert!(matches!(err, AccessError::MemberNotFound { .. }));
    }

    #[test]
    fn test_getter_fn_receives_host() {
        let accessor = Accessor::from_fn(|host| {
            let n = host.get_field("n").and_then(|v| v.as_i64()).unwrap_or(0);
            Ok(json!(n * 2))
        });
        assert_eq!(accessor.get(&json!({"n": 21})).unwrap(), json!(42));
    }

    #[test]
    fn test_identity_returns_host() {
        let doc = json!({"href": "/x"});
        assert_eq!(Accessor::identity().get(&doc).unwrap(), doc);
    }

    #[test]
    fn test_missing_getter_fails_fast() {
        let accessor = Accessor::new().with_setter("a");
        assert_eq!(accessor.get(&json!({"a": 1})).unwrap_err(), AccessError::MissingGetter);
    }

    #[test]
    fn test_missing_setter_fails_fast() {
        let mut doc = json!({});
        let err = Accessor::from_fn(|_| Ok(json!(1))).set(&mut doc, json!(1)).unwrap_err();
        assert_eq!(err, AccessError::MissingSetter);
    }

    #[test]
    fn test_set_creates_missing_intermediate_mappings() {
        let mut doc = json!({});
        let assigned = Accessor::path("a.b.c").set(&mut doc, json!(5)).unwrap();
        assert_eq!(assigned, json!(5));
        assert_eq!(doc, json!({"a": {"b": {"c": 5}}}));
    }

    #[test]
    fn test_set_preserves_existing_siblings() {
        let mut doc = json!({"a": {"keep": true}});
        Accessor::path("a.b").set(&mut doc, json!(1)).unwrap();
        assert_eq!(doc, json!({"a": {"keep": true, "b": 1}}));
    }

    #[test]
    fn test_set_replaces_null_intermediates() {
        let mut doc = json!({"meta": null});
        Accessor::path("meta.title").set(&mut doc, json!("Dune")).unwrap();
        assert_eq!(doc, json!({"meta": {"title": "Dune"}}));

        let mut doc = json!({"a": {"b": null}});
        Accessor::path("a.b.c").set(&mut doc, json!(1)).unwrap();
        assert_eq!(doc, json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn test_set_into_record_with_unset_optional_member() {
        #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
        struct Meta {
            title: String,
        }
        #[derive(Debug, Default, Serialize, Deserialize)]
        struct Book {
            meta: Option<Meta>,
        }
        let mut record = Record::<Book>::with_default().unwrap();
        Accessor::path("meta.title")
            .set(&mut record, json!("Dune"))
            .unwrap();
        assert_eq!(
            record.into_inner().unwrap().meta,
            Some(Meta {
                title: "Dune".into()
            })
        );
    }

    #[test]
    fn test_set_through_scalar_is_rejected() {
        let mut doc = json!({"a": 3});
        let err = Accessor::path("a.b").set(&mut doc, json!(1)).unwrap_err();
        assert!(matches!(err, AccessError::NotTraversable { .. }));
    }

    #[test]
    fn test_set_on_record_member() {
        #[derive(Debug, Default, Serialize, Deserialize)]
        struct Counter {
            count: i64,
        }
        let mut record = Record::<Counter>::with_default().unwrap();
        Accessor::path("count").set(&mut record, json!(3)).unwrap();
        assert_eq!(record.into_inner().unwrap().count, 3);
    }

    #[test]
    fn test_setter_fn_is_invoked() {
        let accessor = Accessor::new().with_setter_fn(|host, value| host.set_field("mirror", value));
        let mut doc = json!({});
        accessor.set(&mut doc, json!("x")).unwrap();
        assert_eq!(doc, json!({"mirror": "x"}));
    }

    #[test]
    fn test_path_display_round_trips() {
        assert_eq!(AttrPath::parse("a.b.c").to_string(), "a.b.c");
        assert_eq!(AttrPath::from("a").segments(), &["a".to_string()]);
    }
}
