//! Conversions between typed views and store records.

use flatdb_api::prelude::{
    FlatDbError, FlatDbResult, MaxStrlenValidator, MinStrlenValidator, Record, RecordId,
    TableStore, Validate as _,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Serializes a payload into record fields.
pub fn to_record<T: Serialize>(payload: &T) -> FlatDbResult<Record> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(other) => Err(FlatDbError::InvalidRecord(format!(
            "expected an object payload, got {other}"
        ))),
        Err(err) => Err(FlatDbError::InvalidRecord(err.to_string())),
    }
}

/// Deserializes a stored record of `table` into its typed view.
pub fn from_record<T: DeserializeOwned>(table: &str, record: Record) -> FlatDbResult<T> {
    serde_json::from_value(Value::Object(record))
        .map_err(|err| FlatDbError::Validation(format!("invalid {table} record: {err}")))
}

/// Deserializes many stored records of `table`.
pub fn from_records<T: DeserializeOwned>(table: &str, records: Vec<Record>) -> FlatDbResult<Vec<T>> {
    records
        .into_iter()
        .map(|record| from_record(table, record))
        .collect()
}

/// Checks that a required text field is not blank.
pub fn required(field: &str, value: &str) -> FlatDbResult<()> {
    MinStrlenValidator(1)
        .validate(&Value::from(value))
        .map_err(|_| FlatDbError::Validation(format!("Field '{field}' is required and cannot be empty")))
}

/// Checks that a text field, once trimmed, is at most `max` characters long.
pub fn max_len(field: &str, value: &str, max: usize) -> FlatDbResult<()> {
    MaxStrlenValidator(max)
        .validate(&Value::from(value.trim()))
        .map_err(|_| FlatDbError::Validation(format!("Field '{field}' cannot exceed {max} characters")))
}

/// Implements `TryFrom<Record>` for a typed view of a table.
macro_rules! impl_try_from_record {
    ($view:ty, $table:expr) => {
        impl TryFrom<flatdb_api::prelude::Record> for $view {
            type Error = flatdb_api::prelude::FlatDbError;

            fn try_from(
                record: flatdb_api::prelude::Record,
            ) -> flatdb_api::prelude::FlatDbResult<Self> {
                $crate::fields::from_record($table, record)
            }
        }
    };
}

pub(crate) use impl_try_from_record;

/// Reads back a record right after it was written.
pub fn fetch<T: DeserializeOwned>(
    store: &impl TableStore,
    table: &str,
    id: &RecordId,
) -> FlatDbResult<T> {
    let record = store.get(table, id)?.ok_or_else(|| {
        FlatDbError::InvalidRecord(format!("{table} record {id} disappeared after write"))
    })?;
    from_record(table, record)
}

#[cfg(test)]
mod tests {

    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        #[serde(default)]
        count: u32,
    }

    #[test]
    fn test_should_convert_payload_to_record() {
        let record = to_record(&Sample {
            name: "a".to_string(),
            count: 2,
        })
        .unwrap();
        assert_eq!(Value::Object(record), json!({"name": "a", "count": 2}));

        assert!(to_record(&"not an object").is_err());
    }

    #[test]
    fn test_should_convert_record_to_view() {
        let record = json!({"id": 1, "name": "a"}).as_object().cloned().unwrap();
        let sample: Sample = from_record("samples", record).unwrap();
        assert_eq!(
            sample,
            Sample {
                name: "a".to_string(),
                count: 0
            }
        );

        let record = json!({"count": 1}).as_object().cloned().unwrap();
        let err = from_record::<Sample>("samples", record).unwrap_err();
        assert!(err.to_string().starts_with("Validation error: invalid samples record"));
    }

    #[test]
    fn test_should_require_non_blank_text() {
        assert!(required("title", "Fix bug").is_ok());
        let err = required("title", "  ").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Field 'title' is required and cannot be empty"
        );
    }

    #[test]
    fn test_should_cap_text_length() {
        assert!(max_len("name", "Ünïcödé", 7).is_ok());
        assert!(max_len("name", "  abc  ", 3).is_ok());
        let err = max_len("name", "abcd", 3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Field 'name' cannot exceed 3 characters"
        );
    }
}
