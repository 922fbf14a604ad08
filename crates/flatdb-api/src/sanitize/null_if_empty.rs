use serde_json::Value;

use crate::prelude::{FlatDbResult, Sanitize};

/// The [`NullIfEmptySanitizer`] struct is used to sanitize input by converting empty strings to null values.
///
/// This [`Sanitize`] never returns an error.
///
/// # Example
///
/// ```rust
/// use flatdb_api::prelude::{NullIfEmptySanitizer, Sanitize as _};
/// use serde_json::{Value, json};
///
/// let sanitized_value = NullIfEmptySanitizer.sanitize(json!("")).unwrap();
/// assert_eq!(sanitized_value, Value::Null);
/// ```
pub struct NullIfEmptySanitizer;

impl Sanitize for NullIfEmptySanitizer {
    fn sanitize(&self, value: Value) -> FlatDbResult<Value> {
        match value {
            Value::String(text) if text.is_empty() => Ok(Value::Null),
            other => Ok(other),
        }
    }
}
