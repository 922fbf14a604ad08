use lazy_regex::{Lazy, Regex, lazy_regex};
use serde_json::Value;

use crate::prelude::{FlatDbError, FlatDbResult, Validate};

static DUE_DATE_REGEX: Lazy<Regex> = lazy_regex!(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}$");

/// A validator for due dates in the `YYYY-MM-DDTHH:MM` format of a `datetime-local` input.
///
/// # Example
///
/// ```rust
/// use flatdb_api::prelude::{DueDateValidator, Validate};
/// use serde_json::json;
///
/// assert!(DueDateValidator.validate(&json!("2024-05-01T17:30")).is_ok());
/// assert!(DueDateValidator.validate(&json!("2024-05-01")).is_err());
/// ```
pub struct DueDateValidator;

impl Validate for DueDateValidator {
    fn validate(&self, value: &Value) -> FlatDbResult<()> {
        let Value::String(text) = value else {
            return Err(FlatDbError::Validation(
                "DueDateValidator can only be applied to string values".to_string(),
            ));
        };

        if DUE_DATE_REGEX.is_match(text) {
            Ok(())
        } else {
            Err(FlatDbError::Validation(format!(
                "Value '{text}' is not a valid due date"
            )))
        }
    }
}
