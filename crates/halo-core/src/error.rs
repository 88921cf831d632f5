//! # Error Types — Structured, Aggregatable Failures
//!
//! Defines the error types used throughout halo. Enums use `thiserror` for
//! derive-based `Display` and `Error` implementations; [`ValidationError`]
//! is a recursive struct because its rendering is a public contract.
//!
//! ## Taxonomy
//!
//! - [`AccessError`] — reading or writing a host object failed. Lookup
//!   failures (`is_lookup()`) are recoverable by a configured default;
//!   missing getters/setters are programmer errors.
//! - [`ValidationError`] — a Type or Validator rejected a value. Always
//!   surfaced, tagged with the offending attribute once an enclosing
//!   attribute or schema catches it.
//! - [`SchemaError`] — the union returned by attribute and schema entry
//!   points, including the "deserialization unsupported" signal.
//!
//! ## Rendering Contract
//!
//! An aggregate [`ValidationError`] renders as
//! `{"errors": {"<attr>": [<child>, ...], ...}}`. Leaf children render as
//! their message string; aggregate children render recursively, so a
//! nested schema failure appears as a nested `{"errors": {...}}` object
//! under its field.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::map::Entry;
use serde_json::{Map, Value};
use thiserror::Error;

/// Message used when a required attribute is absent from its compartment.
pub const MISSING_ATTRIBUTE: &str = "Missing attribute.";

/// Rendering key for errors that are not attached to any attribute.
pub const NON_FIELD_KEY: &str = "_schema";

/// Failure to read from or write to a host object.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The accessor has no getter but a read was requested.
    #[error("getter accessor is not specified")]
    MissingGetter,

    /// The accessor has no setter but a write was requested.
    #[error("setter accessor is not specified")]
    MissingSetter,

    /// A mapping host or intermediate mapping lacks the key.
    #[error("key '{key}' not found in mapping")]
    KeyNotFound {
        /// The path segment that was looked up.
        key: String,
    },

    /// A structured host (or a scalar reached mid-path) lacks the member.
    #[error("member '{member}' not found on object")]
    MemberNotFound {
        /// The path segment that was looked up.
        member: String,
    },

    /// An assignment path crosses a value that is not a mapping.
    #[error("cannot traverse '{segment}': value is not a mapping")]
    NotTraversable {
        /// The segment holding the non-mapping value.
        segment: String,
    },

    /// The host cannot be viewed as a document value.
    #[error("host cannot be represented as a document value")]
    Unrepresentable,

    /// The host refused an assignment.
    #[error("cannot assign '{field}': {reason}")]
    Rejected {
        /// The field that was being assigned.
        field: String,
        /// Why the host refused it.
        reason: String,
    },
}

impl AccessError {
    /// Whether this failure means "the source value is missing", which an
    /// attribute default may recover from.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::KeyNotFound { .. } | Self::MemberNotFound { .. } | Self::NotTraversable { .. }
        )
    }
}

/// A structured validation failure.
///
/// A leaf carries a message; an aggregate carries child errors and usually
/// no message of its own. Either may carry the `attr` it was reported for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: Option<String>,
    attr: Option<String>,
    errors: Vec<ValidationError>,
}

impl ValidationError {
    /// Create a leaf error with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            attr: None,
            errors: Vec::new(),
        }
    }

    /// Create the leaf error reported for an absent required attribute.
    pub fn missing(attr: impl Into<String>) -> Self {
        Self::new(MISSING_ATTRIBUTE).with_attr(attr)
    }

    /// Create an aggregate wrapping every collected error.
    pub fn aggregate(errors: Vec<ValidationError>) -> Self {
        Self {
            message: None,
            attr: None,
            errors,
        }
    }

    /// Wrap an aggregate produced by a nested conversion under `attr`.
    pub fn nested(attr: impl Into<String>, inner: ValidationError) -> Self {
        Self {
            message: None,
            attr: Some(attr.into()),
            errors: vec![inner],
        }
    }

    /// Replace the attribute tag.
    pub fn with_attr(mut self, attr: impl Into<String>) -> Self {
        self.attr = Some(attr.into());
        self
    }

    /// Attach this error to `attr`: a leaf is tagged directly, an aggregate
    /// is wrapped so that it renders nested under `attr`.
    pub fn tagged(self, attr: impl Into<String>) -> Self {
        if self.is_leaf() {
            self.with_attr(attr)
        } else {
            Self::nested(attr, self)
        }
    }

    /// The message of a leaf error.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The attribute this error was reported for.
    pub fn attr(&self) -> Option<&str> {
        self.attr.as_deref()
    }

    /// Child errors of an aggregate.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Returns true if this error has no children.
    pub fn is_leaf(&self) -> bool {
        self.errors.is_empty()
    }

    /// Render as `{"errors": {attr: [child, ...]}}`.
    ///
    /// A leaf is rendered as an aggregate of itself. Errors without an
    /// attribute are grouped under [`NON_FIELD_KEY`]; repeated attributes
    /// merge their children in order.
    pub fn to_value(&self) -> Value {
        let children = if self.is_leaf() {
            std::slice::from_ref(self)
        } else {
            self.errors.as_slice()
        };

        let mut rendered = Map::new();
        for error in children {
            let key = error.attr.as_deref().unwrap_or(NON_FIELD_KEY).to_string();
            let dumped = error.dump_children();
            match rendered.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(Value::Array(dumped));
                }
                Entry::Occupied(mut slot) => {
                    if let Value::Array(items) = slot.get_mut() {
                        items.extend(dumped);
                    }
                }
            }
        }

        let mut root = Map::new();
        root.insert("errors".to_string(), Value::Object(rendered));
        Value::Object(root)
    }

    fn dump_children(&self) -> Vec<Value> {
        if self.is_leaf() {
            vec![self.dump()]
        } else {
            self.errors.iter().map(Self::dump).collect()
        }
    }

    fn dump(&self) -> Value {
        if self.is_leaf() {
            Value::String(self.message.clone().unwrap_or_default())
        } else {
            self.to_value()
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(attr) = &self.attr {
            write!(f, "{attr}: ")?;
        }
        if self.is_leaf() {
            return write!(f, "{}", self.message.as_deref().unwrap_or("invalid value"));
        }
        write!(f, "[")?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
        }
        write!(f, "]")
    }
}

impl std::error::Error for ValidationError {}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Error returned by attribute and schema operations.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Reading or writing a host object failed.
    #[error("access error: {0}")]
    Access(#[from] AccessError),

    /// One or more values failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The attribute does not take part in deserialization.
    #[error("attribute '{attr}' does not support deserialization")]
    Unsupported {
        /// Name of the write-only or constant attribute.
        attr: String,
    },

    /// A value could not be converted on the serialize side.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The kind of value the Type accepts.
        expected: &'static str,
        /// The kind of value it was given.
        found: &'static str,
    },

    /// Conversion between a structured value and a document failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SchemaError {
    /// Whether this error is a lookup failure of the source value.
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Access(e) if e.is_lookup())
    }
}

/// Name of the JSON kind of `value`, for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
