use serde_json::Value;

use crate::prelude::{FlatDbError, FlatDbResult, Validate};

/// A validator that checks that a number, or a numeric string, is not negative.
///
/// # Example
///
/// ```rust
/// use flatdb_api::prelude::{NonNegativeValidator, Validate};
/// use serde_json::json;
///
/// assert!(NonNegativeValidator.validate(&json!(0)).is_ok());
/// assert!(NonNegativeValidator.validate(&json!("12.5")).is_ok());
/// assert!(NonNegativeValidator.validate(&json!(-1)).is_err());
/// ```
pub struct NonNegativeValidator;

impl Validate for NonNegativeValidator {
    fn validate(&self, value: &Value) -> FlatDbResult<()> {
        let number = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        };
        let Some(number) = number else {
            return Err(FlatDbError::Validation(format!(
                "Value '{value}' is not a number"
            )));
        };

        if number >= 0.0 {
            Ok(())
        } else {
            Err(FlatDbError::Validation(format!(
                "Value {number} must not be negative"
            )))
        }
    }
}
