//! # Field Hosts
//!
//! [`FieldHost`] is the capability an accessor needs from the object it
//! reads from or writes into: named field lookup and assignment. Mapping
//! hosts look fields up by key; structured hosts look them up by member.
//!
//! Adapters are provided for document values and string-keyed maps
//! (mapping hosts) and for any serde-compatible struct through
//! [`Record`] (structured host). A hand-written `FieldHost` impl may
//! compute a member on lookup, which is how derived values such as
//! `full_name` are exposed to a schema.

use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{value_kind, AccessError, SchemaError};

/// How a host resolves field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    /// Fields are keys of a mapping.
    Mapping,
    /// Fields are members of a structured object.
    Record,
}

/// An object that exposes named fields to accessors.
pub trait FieldHost {
    /// How this host resolves names; decides which lookup error is raised.
    fn kind(&self) -> HostKind;

    /// Look up a field, returning `None` when it does not exist.
    fn get_field(&self, name: &str) -> Option<Value>;

    /// Assign a field.
    fn set_field(&mut self, name: &str, value: Value) -> Result<(), AccessError>;

    /// View the whole host as a document value.
    fn to_value(&self) -> Result<Value, AccessError> {
        Err(AccessError::Unrepresentable)
    }
}

/// The lookup error a host of `kind` raises for a missing `name`.
pub fn lookup_error(kind: HostKind, name: &str) -> AccessError {
    match kind {
        HostKind::Mapping => AccessError::KeyNotFound {
            key: name.to_string(),
        },
        HostKind::Record => AccessError::MemberNotFound {
            member: name.to_string(),
        },
    }
}

impl FieldHost for Map<String, Value> {
    fn kind(&self) -> HostKind {
        HostKind::Mapping
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), AccessError> {
        self.insert(name.to_string(), value);
        Ok(())
    }

    fn to_value(&self) -> Result<Value, AccessError> {
        Ok(Value::Object(self.clone()))
    }
}

/// A document value is a mapping host when it is an object. Any other
/// value has no members: lookups fail and assignments are rejected.
impl FieldHost for Value {
    fn kind(&self) -> HostKind {
        if self.is_object() {
            HostKind::Mapping
        } else {
            HostKind::Record
        }
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        self.as_object().and_then(|map| map.get(name)).cloned()
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), AccessError> {
        match self {
            Value::Object(map) => {
                map.insert(name.to_string(), value);
                Ok(())
            }
            other => Err(AccessError::Rejected {
                field: name.to_string(),
                reason: format!("host is {}, not a mapping", value_kind(other)),
            }),
        }
    }

    fn to_value(&self) -> Result<Value, AccessError> {
        Ok(self.clone())
    }
}

impl FieldHost for BTreeMap<String, Value> {
    fn kind(&self) -> HostKind {
        HostKind::Mapping
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), AccessError> {
        self.insert(name.to_string(), value);
        Ok(())
    }

    fn to_value(&self) -> Result<Value, AccessError> {
        Ok(Value::Object(
            self.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        ))
    }
}

impl FieldHost for HashMap<String, Value> {
    fn kind(&self) -> HostKind {
        HostKind::Mapping
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), AccessError> {
        self.insert(name.to_string(), value);
        Ok(())
    }

    fn to_value(&self) -> Result<Value, AccessError> {
        Ok(Value::Object(
            self.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        ))
    }
}

/// Structured host over a serde-compatible struct.
///
/// The struct is captured as its document form; members are looked up by
/// name and only declared members may be assigned. [`Record::into_inner`]
/// rebuilds the struct after a schema has written into it.
///
/// # Invariants
///
/// - `T` must serialize to a JSON object.
/// - The member set is fixed at construction.
#[derive(Debug, Clone)]
pub struct Record<T> {
    members: Map<String, Value>,
    _marker: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> Record<T> {
    /// Capture `value` as a structured host.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Serialization` if `value` cannot be serialized
    /// and `SchemaError::TypeMismatch` if it does not serialize to an object.
    pub fn new(value: &T) -> Result<Self, SchemaError> {
        match serde_json::to_value(value)? {
            Value::Object(members) => Ok(Self {
                members,
                _marker: PhantomData,
            }),
            other => Err(SchemaError::TypeMismatch {
                expected: "object",
                found: value_kind(&other),
            }),
        }
    }

    /// Current member values.
    pub fn members(&self) -> &Map<String, Value> {
        &self.members
    }

    /// Rebuild the struct from the current member values.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Serialization` if an assigned member no longer
    /// fits the struct's field type.
    pub fn into_inner(self) -> Result<T, SchemaError> {
        Ok(serde_json::from_value(Value::Object(self.members))?)
    }
}

impl<T: Default + Serialize + DeserializeOwned> Record<T> {
    /// Capture `T::default()`, typically as a deserialization target.
    pub fn with_default() -> Result<Self, SchemaError> {
        Self::new(&T::default())
    }
}

impl<T> FieldHost for Record<T> {
    fn kind(&self) -> HostKind {
        HostKind::Record
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        self.members.get(name).cloned()
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), AccessError> {
        match self.members.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(AccessError::MemberNotFound {
                member: name.to_string(),
            }),
        }
    }

    fn to_value(&self) -> Result<Value, AccessError> {
        Ok(Value::Object(self.members.clone()))
    }
}
