use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the field holding the record identifier.
pub const ID_FIELD: &str = "id";
/// Name of the field holding the creation timestamp.
pub const CREATED_AT_FIELD: &str = "created_at";
/// Name of the field holding the last update timestamp.
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// A record is an ordered mapping of field names to JSON values.
///
/// Field order is the insertion order, and it is kept when the table is written back.
pub type Record = Map<String, Value>;

/// Identifier of a record.
///
/// Matching against stored values is type-aware: `RecordId::Int(1)` matches the JSON number `1`
/// but not the string `"1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// Reads an identifier from a JSON value.
    ///
    /// Returns [`None`] for values which can't be an identifier (floats, bools, null, containers).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_i64().map(RecordId::Int),
            Value::String(text) => Some(RecordId::Text(text.clone())),
            _ => None,
        }
    }

    /// Reads the identifier of a record, if it has a valid one.
    pub fn of(record: &Record) -> Option<Self> {
        record.get(ID_FIELD).and_then(Self::from_value)
    }

    /// Returns whether the given stored value is this identifier.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (RecordId::Int(id), Value::Number(number)) => number.as_i64() == Some(*id),
            (RecordId::Text(id), Value::String(text)) => id == text,
            _ => false,
        }
    }

    /// Returns whether `record` has this identifier.
    pub fn is_id_of(&self, record: &Record) -> bool {
        record
            .get(ID_FIELD)
            .is_some_and(|value| self.matches(value))
    }

    /// Converts the identifier into a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Int(id) => Value::from(*id),
            RecordId::Text(id) => Value::from(id.as_str()),
        }
    }

    /// Returns the integer identifier, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            RecordId::Int(id) => Some(*id),
            RecordId::Text(_) => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{id}"),
            RecordId::Text(id) => write!(f, "{id}"),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Int(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Text(value)
    }
}

impl From<RecordId> for Value {
    fn from(value: RecordId) -> Self {
        value.to_value()
    }
}

#[cfg(test)]
mod test {

    use serde_json::json;

    use super::*;

    #[test]
    fn test_should_match_ids_type_aware() {
        assert!(RecordId::Int(1).matches(&json!(1)));
        assert!(!RecordId::Int(1).matches(&json!("1")));
        assert!(!RecordId::Int(1).matches(&json!(1.5)));
        assert!(RecordId::from("dept0a1b2c").matches(&json!("dept0a1b2c")));
        assert!(!RecordId::from("1").matches(&json!(1)));
    }

    #[test]
    fn test_should_read_id_from_value() {
        assert_eq!(RecordId::from_value(&json!(7)), Some(RecordId::Int(7)));
        assert_eq!(
            RecordId::from_value(&json!("proj1")),
            Some(RecordId::Text("proj1".to_string()))
        );
        assert_eq!(RecordId::from_value(&json!(2.5)), None);
        assert_eq!(RecordId::from_value(&json!(null)), None);
        assert_eq!(RecordId::from_value(&json!(true)), None);
    }

    #[test]
    fn test_should_read_id_of_record() {
        let record = json!({"id": 3, "title": "x"});
        let record = record.as_object().unwrap();
        assert_eq!(RecordId::of(record), Some(RecordId::Int(3)));
        assert!(RecordId::Int(3).is_id_of(record));
        assert!(!RecordId::Int(4).is_id_of(record));

        let no_id = Record::new();
        assert_eq!(RecordId::of(&no_id), None);
    }

    #[test]
    fn test_should_serialize_untagged() {
        assert_eq!(serde_json::to_string(&RecordId::Int(5)).unwrap(), "5");
        assert_eq!(
            serde_json::to_string(&RecordId::from("dept")).unwrap(),
            "\"dept\""
        );
        let id: RecordId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(id, RecordId::Text("abc".to_string()));
    }

    #[test]
    fn test_should_display_record_id() {
        assert_eq!(RecordId::Int(42).to_string(), "42");
        assert_eq!(RecordId::from("proj42").to_string(), "proj42");
        assert_eq!(RecordId::Int(42).as_int(), Some(42));
        assert_eq!(RecordId::from("x").as_int(), None);
    }
}
