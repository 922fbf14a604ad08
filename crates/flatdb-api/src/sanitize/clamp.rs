use serde_json::{Number, Value};

use crate::prelude::{FlatDbError, FlatDbResult, Sanitize};

/// Sanitizer that clamps numeric values within a specified range.
///
/// Integers stay integers; floating point values are clamped as floats.
///
/// # Example
///
/// ```rust
/// use flatdb_api::prelude::{ClampSanitizer, Sanitize as _};
/// use serde_json::json;
///
/// let sanitizer = ClampSanitizer { min: 0, max: 100 };
/// let sanitized_value = sanitizer.sanitize(json!(150)).unwrap();
/// assert_eq!(sanitized_value, json!(100));
/// ```
pub struct ClampSanitizer {
    pub min: i64,
    pub max: i64,
}

impl Sanitize for ClampSanitizer {
    fn sanitize(&self, value: Value) -> FlatDbResult<Value> {
        if self.min > self.max {
            return Err(FlatDbError::Sanitize(format!(
                "Invalid clamp range {}..={}",
                self.min, self.max
            )));
        }

        match value {
            Value::Number(num) => {
                if let Some(int) = num.as_i64() {
                    return Ok(Value::from(int.clamp(self.min, self.max)));
                }
                if num.is_u64() {
                    // u64 above i64::MAX
                    return Ok(Value::from(self.max));
                }
                let float = num.as_f64().unwrap_or_default();
                let clamped = float.clamp(self.min as f64, self.max as f64);
                Number::from_f64(clamped).map(Value::Number).ok_or_else(|| {
                    FlatDbError::Sanitize(format!("Clamped value {clamped} is not a valid number"))
                })
            }
            other => Ok(other),
        }
    }
}
