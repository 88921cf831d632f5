//! # Types
//!
//! A [`Type`] converts a value between its internal form and its document
//! form. `serialize` performs no validation; `deserialize` runs the Type's
//! validators (skipped for null) and then converts.
//!
//! Types compose: [`List`] delegates element-wise to an item Type, and a
//! [`Schema`](crate::Schema) is itself a Type, so schemas nest.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime as ChronoDateTime, SecondsFormat, Utc};
use serde_json::Value;

use halo_core::{value_kind, SchemaError, ValidationError};

use crate::validators::{validate_all, Validator, ValidatorRef};

/// A unit of value conversion.
pub trait Type: fmt::Debug + Send + Sync {
    /// Convert an internal value to its document form.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::TypeMismatch` when the value cannot be
    /// converted, or whatever error a nested conversion produced.
    fn serialize(&self, value: &Value) -> Result<Value, SchemaError> {
        Ok(value.clone())
    }

    /// Validate and convert a document value to its internal form.
    ///
    /// # Errors
    ///
    /// Returns the first validator failure, or a conversion failure.
    fn deserialize(&self, value: &Value) -> Result<Value, ValidationError> {
        validate_all(self.validators(), value)?;
        Ok(value.clone())
    }

    /// Validators run by `deserialize`, in attachment order.
    fn validators(&self) -> &[ValidatorRef] {
        &[]
    }
}

/// Shared handle to a type.
pub type TypeRef = Arc<dyn Type>;

/// Identity conversion. The default type of an attribute.
#[derive(Debug, Clone, Default)]
pub struct Any {
    validators: Vec<ValidatorRef>,
}

impl Any {
    /// Identity type without validators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a validator.
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Append already shared validators.
    pub fn with_validators(mut self, validators: impl IntoIterator<Item = ValidatorRef>) -> Self {
        self.validators.extend(validators);
        self
    }
}

impl Type for Any {
    fn validators(&self) -> &[ValidatorRef] {
        &self.validators
    }
}

/// The JSON scalar accepted by a [`Scalar`] type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// A string.
    String,
    /// A number without a fractional part.
    Integer,
    /// Any number.
    Number,
    /// A boolean.
    Boolean,
}

impl ScalarKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            ScalarKind::String => value.is_string(),
            ScalarKind::Integer => value.is_i64() || value.is_u64(),
            ScalarKind::Number => value.is_number(),
            ScalarKind::Boolean => value.is_boolean(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Integer => "integer",
            ScalarKind::Number => "number",
            ScalarKind::Boolean => "boolean",
        }
    }

    fn rejection(self) -> &'static str {
        match self {
            ScalarKind::String => "Value is not a string.",
            ScalarKind::Integer => "Value is not an integer.",
            ScalarKind::Number => "Value is not a number.",
            ScalarKind::Boolean => "Value is not a boolean.",
        }
    }
}

/// A type accepting one kind of JSON scalar. Null passes through.
#[derive(Debug, Clone)]
pub struct Scalar {
    kind: ScalarKind,
    validators: Vec<ValidatorRef>,
}

impl Scalar {
    /// A scalar type of `kind`.
    pub fn new(kind: ScalarKind) -> Self {
        Self {
            kind,
            validators: Vec::new(),
        }
    }

    /// Strings only.
    pub fn string() -> Self {
        Self::new(ScalarKind::String)
    }

    /// Integers only.
    pub fn integer() -> Self {
        Self::new(ScalarKind::Integer)
    }

    /// Any number.
    pub fn number() -> Self {
        Self::new(ScalarKind::Number)
    }

    /// Booleans only.
    pub fn boolean() -> Self {
        Self::new(ScalarKind::Boolean)
    }

    /// The accepted kind.
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Attach a validator.
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Append already shared validators.
    pub fn with_validators(mut self, validators: impl IntoIterator<Item = ValidatorRef>) -> Self {
        self.validators.extend(validators);
        self
    }
}

impl Type for Scalar {
    fn serialize(&self, value: &Value) -> Result<Value, SchemaError> {
        if value.is_null() || self.kind.accepts(value) {
            Ok(value.clone())
        } else {
            Err(SchemaError::TypeMismatch {
                expected: self.kind.name(),
                found: value_kind(value),
            })
        }
    }

    fn deserialize(&self, value: &Value) -> Result<Value, ValidationError> {
        validate_all(&self.validators, value)?;
        if value.is_null() || self.kind.accepts(value) {
            Ok(value.clone())
        } else {
            Err(ValidationError::new(self.kind.rejection()))
        }
    }

    fn validators(&self) -> &[ValidatorRef] {
        &self.validators
    }
}

/// RFC 3339 timestamps, normalized to UTC `YYYY-MM-DDTHH:MM:SSZ` in both
/// directions. Offsets are converted; sub-seconds are dropped.
#[derive(Debug, Clone, Default)]
pub struct DateTime {
    validators: Vec<ValidatorRef>,
}

impl DateTime {
    /// Timestamp type without validators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a validator.
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Append already shared validators.
    pub fn with_validators(mut self, validators: impl IntoIterator<Item = ValidatorRef>) -> Self {
        self.validators.extend(validators);
        self
    }

    fn normalize(value: &str) -> Option<String> {
        let parsed = ChronoDateTime::parse_from_rfc3339(value).ok()?;
        Some(
            parsed
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    }
}

impl Type for DateTime {
    fn serialize(&self, value: &Value) -> Result<Value, SchemaError> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::String(s) => Self::normalize(s).map(Value::String).ok_or(
                SchemaError::TypeMismatch {
                    expected: "RFC 3339 datetime",
                    found: "string",
                },
            ),
            other => Err(SchemaError::TypeMismatch {
                expected: "RFC 3339 datetime",
                found: value_kind(other),
            }),
        }
    }

    fn deserialize(&self, value: &Value) -> Result<Value, ValidationError> {
        validate_all(&self.validators, value)?;
        match value {
            Value::Null => Ok(Value::Null),
            Value::String(s) => Self::normalize(s)
                .map(Value::String)
                .ok_or_else(|| ValidationError::new("Value is not a valid RFC 3339 datetime.")),
            _ => Err(ValidationError::new("Value is not a valid RFC 3339 datetime.")),
        }
    }

    fn validators(&self) -> &[ValidatorRef] {
        &self.validators
    }
}

/// A list whose items are converted by an item Type, preserving order and
/// length.
#[derive(Debug, Clone)]
pub struct List {
    item_type: TypeRef,
    validators: Vec<ValidatorRef>,
}

impl List {
    /// A list of `item_type`.
    pub fn new(item_type: impl Type + 'static) -> Self {
        Self::of(Arc::new(item_type))
    }

    /// A list of an already shared item type.
    pub fn of(item_type: TypeRef) -> Self {
        Self {
            item_type,
            validators: Vec::new(),
        }
    }

    /// A list of untyped items.
    pub fn any() -> Self {
        Self::new(Any::new())
    }

    /// The item type.
    pub fn item_type(&self) -> &TypeRef {
        &self.item_type
    }

    /// Attach a validator; it sees the whole list.
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Append already shared validators.
    pub fn with_validators(mut self, validators: impl IntoIterator<Item = ValidatorRef>) -> Self {
        self.validators.extend(validators);
        self
    }
}

impl Type for List {
    fn serialize(&self, value: &Value) -> Result<Value, SchemaError> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| self.item_type.serialize(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Err(SchemaError::TypeMismatch {
                expected: "array",
                found: value_kind(other),
            }),
        }
    }

    /// Item failures are collected, each tagged with its index, into one
    /// aggregate error.
    fn deserialize(&self, value: &Value) -> Result<Value, ValidationError> {
        validate_all(&self.validators, value)?;
        let items = match value {
            Value::Null => return Ok(Value::Null),
            Value::Array(items) => items,
            _ => return Err(ValidationError::new("Value is not a list.")),
        };

        let mut converted = Vec::with_capacity(items.len());
        let mut errors = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match self.item_type.deserialize(item) {
                Ok(value) => converted.push(value),
                Err(e) => errors.push(e.tagged(index.to_string())),
            }
        }

        if errors.is_empty() {
            Ok(Value::Array(converted))
        } else {
            Err(ValidationError::aggregate(errors))
        }
    }

    fn validators(&self) -> &[ValidatorRef] {
        &self.validators
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{Length, Range};
    use serde_json::json;

    #[test]
    fn test_any_is_identity() {
        let any = Any::new();
        assert_eq!(any.serialize(&json!({"a": [1]})).unwrap(), json!({"a": [1]}));
        assert_eq!(any.deserialize(&json!("x")).unwrap(), json!("x"));
    }

    #[test]
    fn test_any_runs_validators_on_deserialize_only() {
        let any = Any::new().with_validator(Length::at_least(3));
        assert_eq!(any.serialize(&json!("a")).unwrap(), json!("a"));
        assert!(any.deserialize(&json!("a")).is_err());
        assert_eq!(any.deserialize(&Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_scalar_kinds() {
        assert!(Scalar::string().deserialize(&json!("a")).is_ok());
        assert!(Scalar::integer().deserialize(&json!(3)).is_ok());
        assert!(Scalar::number().deserialize(&json!(3.5)).is_ok());
        assert!(Scalar::boolean().deserialize(&json!(false)).is_ok());

        let err = Scalar::integer().deserialize(&json!(3.5)).unwrap_err();
        assert_eq!(err.message(), Some("Value is not an integer."));

        let err = Scalar::string().serialize(&json!(1)).unwrap_err();
        assert!(
            matches!(err, SchemaError::TypeMismatch { expected: "string", found: "number" }),
            "got: {err}"
        );
    }

    #[test]
    fn test_scalar_validators_run_before_kind_check() {
        let age = Scalar::integer().with_validator(Range::between(0.0, 150.0));
        let err = age.deserialize(&json!(200)).unwrap_err();
        assert_eq!(err.message(), Some("Value is greater than maximum value '150'."));
    }

    #[test]
    fn test_datetime_normalizes_to_utc_seconds() {
        let dt = DateTime::new();
        assert_eq!(
            dt.deserialize(&json!("2024-03-01T12:30:45.123+02:00")).unwrap(),
            json!("2024-03-01T10:30:45Z")
        );
        assert_eq!(
            dt.serialize(&json!("2024-03-01T10:30:45Z")).unwrap(),
            json!("2024-03-01T10:30:45Z")
        );
    }

    #[test]
    fn test_datetime_rejects_garbage() {
        let err = DateTime::new().deserialize(&json!("yesterday")).unwrap_err();
        assert_eq!(err.message(), Some("Value is not a valid RFC 3339 datetime."));
        assert!(DateTime::new().serialize(&json!(12)).is_err());
    }

    #[test]
    fn test_list_serializes_items_in_order() {
        let list = List::new(Scalar::integer());
        assert_eq!(list.serialize(&json!([3, 1, 2])).unwrap(), json!([3, 1, 2]));
    }

    #[test]
    fn test_list_serialize_propagates_item_error() {
        let err = List::new(Scalar::integer())
            .serialize(&json!([1, "two"]))
            .unwrap_err();
        assert!(matches!(err, SchemaError::TypeMismatch { .. }));
    }

    #[test]
    fn test_list_serialize_rejects_non_array() {
        let err = List::any().serialize(&json!("abc")).unwrap_err();
        assert!(matches!(err, SchemaError::TypeMismatch { expected: "array", .. }));
    }

    #[test]
    fn test_list_length_validator() {
        let list = List::any().with_validator(Length::between(2, 4));
        let err = list.deserialize(&json!([1])).unwrap_err();
        assert_eq!(err.message(), Some("Length is less than 2"));
        assert_eq!(list.deserialize(&json!([1, 2, 3])).unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn test_list_item_errors_are_indexed() {
        let list = List::new(Scalar::string());
        let err = list.deserialize(&json!(["a", 2, "c", false])).unwrap_err();
        assert_eq!(
            err.to_value(),
            json!({"errors": {
                "1": ["Value is not a string."],
                "3": ["Value is not a string."],
            }})
        );
    }

    #[test]
    fn test_list_deserialize_rejects_non_array() {
        let err = List::any().deserialize(&json!({"a": 1})).unwrap_err();
        assert_eq!(err.message(), Some("Value is not a list."));
    }
}
