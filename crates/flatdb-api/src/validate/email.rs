use lazy_regex::{Lazy, Regex, lazy_regex};
use serde_json::Value;

use crate::prelude::{FlatDbError, FlatDbResult, Validate};

static EMAIL_REGEX: Lazy<Regex> =
    lazy_regex!(r"^[A-Za-z0-9]{1}[A-Za-z0-9._%+-]*@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$");

/// A validator for email addresses.
///
/// This validator checks if a given string value conforms to a standard email format.
///
/// # Examples
///
/// ```rust
/// use flatdb_api::prelude::{EmailValidator, Validate};
/// use serde_json::json;
///
/// let validator = EmailValidator;
///
/// assert!(validator.validate(&json!("jane.doe@acme.com")).is_ok());
/// assert!(validator.validate(&json!("invalid-email")).is_err());
/// ```
pub struct EmailValidator;

impl Validate for EmailValidator {
    fn validate(&self, value: &Value) -> FlatDbResult<()> {
        let Value::String(text) = value else {
            return Err(FlatDbError::Validation(
                "EmailValidator can only be applied to string values".to_string(),
            ));
        };

        if EMAIL_REGEX.is_match(text.as_str()) {
            Ok(())
        } else {
            Err(FlatDbError::Validation(format!(
                "Value '{text}' is not a valid email address",
            )))
        }
    }
}
