use serde_json::Value;

use crate::prelude::{FlatDbError, FlatDbResult, Validate};

/// A validator that checks if the length of a string does not exceed a maximum length.
///
/// Length is counted in characters.
///
/// # Example
///
/// ```rust
/// use flatdb_api::prelude::{MaxStrlenValidator, Validate};
/// use serde_json::json;
///
/// let validator = MaxStrlenValidator(10);
/// assert!(validator.validate(&json!("Hello")).is_ok());
/// assert!(validator.validate(&json!("Hello, World!")).is_err());
/// ```
pub struct MaxStrlenValidator(pub usize);

impl Validate for MaxStrlenValidator {
    fn validate(&self, value: &Value) -> FlatDbResult<()> {
        let Value::String(s) = value else {
            return Err(FlatDbError::Validation("Value is not a string".to_string()));
        };

        let len = s.chars().count();
        if len <= self.0 {
            Ok(())
        } else {
            Err(FlatDbError::Validation(format!(
                "String length {len} exceeds maximum allowed length of {}",
                self.0
            )))
        }
    }
}

/// A validator that checks if the length of a string is at least a minimum length.
///
/// Surrounding whitespace is not counted, so `MinStrlenValidator(1)` rejects blank strings.
///
/// # Example
///
/// ```rust
/// use flatdb_api::prelude::{MinStrlenValidator, Validate};
/// use serde_json::json;
///
/// let validator = MinStrlenValidator(5);
/// assert!(validator.validate(&json!("Hello")).is_ok());
/// assert!(validator.validate(&json!("Hi")).is_err());
/// ```
pub struct MinStrlenValidator(pub usize);

impl Validate for MinStrlenValidator {
    fn validate(&self, value: &Value) -> FlatDbResult<()> {
        let Value::String(s) = value else {
            return Err(FlatDbError::Validation("Value is not a string".to_string()));
        };

        let len = s.trim().chars().count();
        if len >= self.0 {
            Ok(())
        } else {
            Err(FlatDbError::Validation(format!(
                "String length {len} is less than minimum required length of {}",
                self.0
            )))
        }
    }
}
