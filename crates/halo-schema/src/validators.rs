//! # Validators
//!
//! Pluggable predicates run by a Type during deserialization. A validator
//! returns `Ok(())` on success and a leaf [`ValidationError`] on failure;
//! the enclosing attribute tags the error with its key.
//!
//! Validators attached to one Type run in attachment order and the first
//! failure aborts that value's deserialization. Each bound validator
//! checks `min` before `max` and reports a single failure per call.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use halo_core::ValidationError;

/// A constraint checked against a deserialized value.
pub trait Validator: fmt::Debug + Send + Sync {
    /// Check `value`.
    ///
    /// # Errors
    ///
    /// Returns a leaf `ValidationError` describing the violated constraint.
    fn validate(&self, value: &Value) -> Result<(), ValidationError>;
}

/// Shared handle to a validator.
pub type ValidatorRef = Arc<dyn Validator>;

/// Run `validators` against `value` in order.
///
/// Null stands for an absent value and is never validated.
pub fn validate_all(validators: &[ValidatorRef], value: &Value) -> Result<(), ValidationError> {
    if value.is_null() {
        return Ok(());
    }
    for validator in validators {
        validator.validate(value)?;
    }
    Ok(())
}

/// Bounds on the length of a list, string, or mapping.
///
/// Values without a length count as length 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Length {
    min: Option<usize>,
    max: Option<usize>,
}

impl Length {
    /// Length bounds; either side may be open.
    pub fn new(min: Option<usize>, max: Option<usize>) -> Self {
        Self { min, max }
    }

    /// At least `min` items.
    pub fn at_least(min: usize) -> Self {
        Self::new(Some(min), None)
    }

    /// At most `max` items.
    pub fn at_most(max: usize) -> Self {
        Self::new(None, Some(max))
    }

    /// Between `min` and `max` items, inclusive.
    pub fn between(min: usize, max: usize) -> Self {
        Self::new(Some(min), Some(max))
    }
}

fn length_of(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::String(s) => s.chars().count(),
        Value::Object(map) => map.len(),
        _ => 0,
    }
}

impl Validator for Length {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let length = length_of(value);

        if let Some(min) = self.min {
            if length < min {
                return Err(ValidationError::new(format!("Length is less than {min}")));
            }
        }

        if let Some(max) = self.max {
            if length > max {
                return Err(ValidationError::new(format!("Length is greater than {max}")));
            }
        }

        Ok(())
    }
}

/// Numeric bounds, inclusive on both sides.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Range {
    min: Option<f64>,
    max: Option<f64>,
}

impl Range {
    /// Numeric bounds; either side may be open.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// No less than `min`.
    pub fn at_least(min: f64) -> Self {
        Self::new(Some(min), None)
    }

    /// No more than `max`.
    pub fn at_most(max: f64) -> Self {
        Self::new(None, Some(max))
    }

    /// Between `min` and `max`.
    pub fn between(min: f64, max: f64) -> Self {
        Self::new(Some(min), Some(max))
    }
}

impl Validator for Range {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if self.min.is_none() && self.max.is_none() {
            return Ok(());
        }

        let Some(number) = value.as_f64() else {
            return Err(ValidationError::new("Value is not a number."));
        };

        if let Some(min) = self.min {
            if number < min {
                return Err(ValidationError::new(format!(
                    "Value is less than minimum value '{min}'."
                )));
            }
        }

        if let Some(max) = self.max {
            if number > max {
                return Err(ValidationError::new(format!(
                    "Value is greater than maximum value '{max}'."
                )));
            }
        }

        Ok(())
    }
}
