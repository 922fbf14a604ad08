use serde_json::Value;

use crate::prelude::{FlatDbError, FlatDbResult, Validate};

/// A validator that checks that a string is one of a fixed set of values.
///
/// # Example
///
/// ```rust
/// use flatdb_api::prelude::{OneOfValidator, Validate};
/// use serde_json::json;
///
/// let validator = OneOfValidator(&["low", "medium", "high"]);
/// assert!(validator.validate(&json!("medium")).is_ok());
/// assert!(validator.validate(&json!("urgent")).is_err());
/// ```
pub struct OneOfValidator(pub &'static [&'static str]);

impl Validate for OneOfValidator {
    fn validate(&self, value: &Value) -> FlatDbResult<()> {
        let Value::String(text) = value else {
            return Err(FlatDbError::Validation("Value is not a string".to_string()));
        };

        if self.0.contains(&text.as_str()) {
            Ok(())
        } else {
            Err(FlatDbError::Validation(format!(
                "Value '{text}' is not one of: {}",
                self.0.join(", ")
            )))
        }
    }
}
