use serde_json::Value;

use crate::prelude::{FlatDbResult, Sanitize};

/// Sanitizer that trims leading and trailing whitespace from strings.
///
/// # Example
///
/// ```rust
/// use flatdb_api::prelude::{Sanitize as _, TrimSanitizer};
/// use serde_json::json;
///
/// let sanitized_value = TrimSanitizer.sanitize(json!("  Engineering  ")).unwrap();
/// assert_eq!(sanitized_value, json!("Engineering"));
/// ```
pub struct TrimSanitizer;

impl Sanitize for TrimSanitizer {
    fn sanitize(&self, value: Value) -> FlatDbResult<Value> {
        match value {
            Value::String(text) => Ok(Value::String(text.trim().to_string())),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {

    use serde_json::json;

    use super::*;

    #[test]
    fn test_trim_sanitizer() {
        let sanitizer = TrimSanitizer;

        assert_eq!(
            sanitizer.sanitize(json!("  Hello, World!  ")).unwrap(),
            json!("Hello, World!")
        );
        assert_eq!(sanitizer.sanitize(json!("Hello")).unwrap(), json!("Hello"));
        assert_eq!(sanitizer.sanitize(json!(42)).unwrap(), json!(42));
    }
}
