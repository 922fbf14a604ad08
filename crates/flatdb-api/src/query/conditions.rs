use serde_json::Value;

use crate::prelude::{Record, loose_eq};

/// Equality conditions of a query, all of which must hold for a record to match.
///
/// A condition on a field never matches a record where the field is missing or `null`.
/// Values are compared with [`loose_eq`].
///
/// ```rust
/// use flatdb_api::prelude::Conditions;
/// use serde_json::json;
///
/// let conditions = Conditions::eq("status", "pending").and_eq("assignee", 3);
/// let record = json!({"id": 1, "status": "pending", "assignee": "3"});
///
/// assert!(conditions.matches(record.as_object().unwrap()));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    fields: Vec<(String, Value)>,
}

impl Conditions {
    /// No conditions: matches every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Creates a single equality condition.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and_eq(field, value)
    }

    /// Adds an equality condition.
    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .map(|(field, value)| (field.as_str(), value))
    }

    /// Returns whether `record` satisfies every condition.
    pub fn matches(&self, record: &Record) -> bool {
        self.fields.iter().all(|(field, expected)| {
            match record.get(field) {
                None | Some(Value::Null) => false,
                Some(stored) => loose_eq(stored, expected),
            }
        })
    }
}

impl From<Record> for Conditions {
    fn from(record: Record) -> Self {
        record.into_iter().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Conditions
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        }
    }
}
