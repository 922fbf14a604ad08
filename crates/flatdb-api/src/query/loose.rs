use serde_json::{Number, Value};

/// Compares a stored value against an expected one with loose equality.
///
/// The rules are those of the loose `==` the tables were historically queried with:
///
/// - numbers compare by numeric value, and numeric strings compare as numbers (`"1" == 1`,
///   `"1.0" == 1`, `"01" == "1"`);
/// - a number and a non-numeric string compare as strings;
/// - a bool compares against the truthiness of the other side;
/// - `null` equals `null` and `false`;
/// - arrays and objects compare element by element, loosely.
///
/// ```rust
/// use flatdb_api::prelude::loose_eq;
/// use serde_json::json;
///
/// assert!(loose_eq(&json!("1"), &json!(1)));
/// assert!(loose_eq(&json!(2), &json!("2.0")));
/// assert!(!loose_eq(&json!("pending"), &json!("completed")));
/// ```
pub fn loose_eq(stored: &Value, expected: &Value) -> bool {
    match (stored, expected) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(b), other) | (other, Value::Bool(b)) => *b == is_truthy(other),
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(a), Value::Number(b)) => numbers_eq(a, b),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            match parse_numeric(s) {
                Some(parsed) => numbers_eq(n, &parsed),
                None => n.to_string() == *s,
            }
        }
        (Value::String(a), Value::String(b)) => match (parse_numeric(a), parse_numeric(b)) {
            (Some(a), Some(b)) => numbers_eq(&a, &b),
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| loose_eq(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, value)| b.get(key).is_some_and(|other| loose_eq(value, other)))
        }
        _ => false,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn numbers_eq(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Parses a numeric string, allowing surrounding whitespace.
fn parse_numeric(s: &str) -> Option<Number> {
    let trimmed = s.trim();
    if trimmed.is_empty()
        || !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        || !trimmed.chars().any(|c| c.is_ascii_digit())
    {
        return None;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Number::from(int));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
}

#[cfg(test)]
mod tests {

    use serde_json::json;

    use super::*;

    #[test]
    fn test_should_compare_numbers_and_numeric_strings() {
        assert!(loose_eq(&json!(1), &json!(1)));
        assert!(loose_eq(&json!(1), &json!(1.0)));
        assert!(loose_eq(&json!("1"), &json!(1)));
        assert!(loose_eq(&json!(1), &json!("1.0")));
        assert!(loose_eq(&json!("01"), &json!("1")));
        assert!(loose_eq(&json!(" 5 "), &json!(5)));
        assert!(loose_eq(&json!("1e1"), &json!(10)));
        assert!(!loose_eq(&json!(1), &json!(2)));
        assert!(!loose_eq(&json!("1"), &json!(2)));
    }

    #[test]
    fn test_should_compare_number_and_text_as_strings() {
        assert!(!loose_eq(&json!(1), &json!("abc")));
        assert!(!loose_eq(&json!(0), &json!("")));
        assert!(!loose_eq(&json!("inf"), &json!(0)));
    }

    #[test]
    fn test_should_compare_strings() {
        assert!(loose_eq(&json!("pending"), &json!("pending")));
        assert!(!loose_eq(&json!("pending"), &json!("Pending")));
        assert!(!loose_eq(&json!("abc"), &json!("ABC")));
    }

    #[test]
    fn test_should_compare_bools_by_truthiness() {
        assert!(loose_eq(&json!(true), &json!(true)));
        assert!(loose_eq(&json!(false), &json!(false)));
        assert!(loose_eq(&json!(true), &json!(1)));
        assert!(loose_eq(&json!("yes"), &json!(true)));
        assert!(loose_eq(&json!(false), &json!("0")));
        assert!(loose_eq(&json!(false), &json!("")));
        assert!(loose_eq(&json!([]), &json!(false)));
        assert!(!loose_eq(&json!(true), &json!(0)));
    }

    #[test]
    fn test_should_compare_null() {
        assert!(loose_eq(&json!(null), &json!(null)));
        assert!(loose_eq(&json!(null), &json!(false)));
        assert!(!loose_eq(&json!(null), &json!("x")));
        assert!(!loose_eq(&json!(0), &json!(null)));
    }

    #[test]
    fn test_should_compare_containers_recursively() {
        assert!(loose_eq(&json!([1, "2"]), &json!(["1", 2])));
        assert!(!loose_eq(&json!([1, 2]), &json!([1])));
        assert!(loose_eq(
            &json!({"id": 1, "name": "Ada"}),
            &json!({"name": "Ada", "id": "1"})
        ));
        assert!(!loose_eq(&json!({"id": 1}), &json!({"key": 1})));
        assert!(!loose_eq(&json!([1]), &json!(1)));
    }
}
