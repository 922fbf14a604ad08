//! Decoding and encoding of table files.

use std::mem;

use flatdb_api::prelude::{FlatDbError, FlatDbResult, Layout, Record, TableDef};
use serde::Serialize as _;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use tracing::warn;

/// The decoded content of a table file.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDocument {
    /// The records of the table, in file order.
    pub records: Vec<Record>,
    /// The envelope object of a wrapped table, with the records field emptied.
    envelope: Option<Map<String, Value>>,
}

/// Converts table files to [`TableDocument`]s and back, according to the table [`Layout`].
#[derive(Debug, Clone, Copy)]
pub struct RecordCodec<'a> {
    table: &'a TableDef,
}

impl<'a> RecordCodec<'a> {
    pub fn new(table: &'a TableDef) -> Self {
        Self { table }
    }

    /// Returns the document of an empty table.
    pub fn empty(&self) -> TableDocument {
        TableDocument {
            records: Vec::new(),
            envelope: match &self.table.layout {
                Layout::Bare => None,
                Layout::Wrapped { field } => {
                    let mut envelope = Map::new();
                    envelope.insert(field.clone(), Value::Null);
                    Some(envelope)
                }
            },
        }
    }

    /// Decodes the content of a table file.
    ///
    /// A missing (`None`), empty or whitespace-only file is an empty table. Anything which is
    /// not JSON of the expected shape fails with [`FlatDbError::CorruptData`].
    pub fn decode(&self, bytes: Option<&[u8]>) -> FlatDbResult<TableDocument> {
        let Some(bytes) = bytes else {
            return Ok(self.empty());
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(self.empty());
        }

        let value: Value = serde_json::from_slice(bytes)
            .map_err(|err| self.corrupt(format!("invalid JSON: {err}")))?;

        match &self.table.layout {
            Layout::Bare => {
                let Value::Array(items) = value else {
                    return Err(self.corrupt("expected a JSON array".to_string()));
                };
                Ok(TableDocument {
                    records: self.records(items)?,
                    envelope: None,
                })
            }
            Layout::Wrapped { field } => {
                let Value::Object(mut envelope) = value else {
                    return Err(self.corrupt("expected a JSON object".to_string()));
                };
                let Some(slot) = envelope.get_mut(field) else {
                    return Err(self.corrupt(format!("missing field '{field}'")));
                };
                // leave the key in place so it keeps its position on encode
                let Value::Array(items) = mem::take(slot) else {
                    return Err(self.corrupt(format!("field '{field}' is not a JSON array")));
                };
                Ok(TableDocument {
                    records: self.records(items)?,
                    envelope: Some(envelope),
                })
            }
        }
    }

    /// Encodes a document as pretty-printed JSON with a four space indent and a trailing newline.
    pub fn encode(&self, document: &TableDocument) -> FlatDbResult<Vec<u8>> {
        let records = Value::Array(
            document
                .records
                .iter()
                .cloned()
                .map(Value::Object)
                .collect(),
        );
        let value = match (&self.table.layout, &document.envelope) {
            (Layout::Bare, _) => records,
            (Layout::Wrapped { field }, envelope) => {
                let mut envelope = envelope.clone().unwrap_or_default();
                envelope.insert(field.clone(), records);
                Value::Object(envelope)
            }
        };

        let mut buf = Vec::with_capacity(4096);
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        value
            .serialize(&mut serializer)
            .map_err(|err| FlatDbError::WriteFailed {
                table: self.table.name.clone(),
                source: err.into(),
            })?;
        buf.push(b'\n');

        Ok(buf)
    }

    fn records(&self, items: Vec<Value>) -> FlatDbResult<Vec<Record>> {
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(record) => Ok(record),
                _ => Err(self.corrupt(format!("element {index} is not a JSON object"))),
            })
            .collect()
    }

    fn corrupt(&self, reason: String) -> FlatDbError {
        warn!(table = %self.table.name, "corrupt table file: {reason}");
        FlatDbError::CorruptData {
            table: self.table.name.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {

    use flatdb_api::prelude::ErrorKind;
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_should_decode_missing_and_blank_files_as_empty() {
        let table = TableDef::bare("users");
        let codec = RecordCodec::new(&table);

        assert!(codec.decode(None).unwrap().records.is_empty());
        assert!(codec.decode(Some(b"")).unwrap().records.is_empty());
        assert!(codec.decode(Some(b"  \n\t ")).unwrap().records.is_empty());
    }

    #[test]
    fn test_should_decode_bare_table() {
        let table = TableDef::bare("tasks");
        let codec = RecordCodec::new(&table);

        let document = codec
            .decode(Some(br#"[{"id": 1, "title": "a"}, {"id": 2, "title": "b"}]"#))
            .unwrap();
        assert_eq!(
            document.records,
            vec![
                record(json!({"id": 1, "title": "a"})),
                record(json!({"id": 2, "title": "b"}))
            ]
        );
    }

    #[test]
    fn test_should_reject_malformed_json() {
        let table = TableDef::bare("tasks");
        let err = RecordCodec::new(&table)
            .decode(Some(b"[{\"id\": 1,"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptData);
    }

    #[test]
    fn test_should_reject_wrong_shape() {
        let bare = TableDef::bare("tasks");
        let wrapped = TableDef::wrapped("departments", "departments");

        let err = RecordCodec::new(&bare)
            .decode(Some(br#"{"tasks": []}"#))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptData);

        let err = RecordCodec::new(&bare)
            .decode(Some(br#"[{"id": 1}, 2]"#))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Corrupt data in table 'tasks': element 1 is not a JSON object"
        );

        let err = RecordCodec::new(&wrapped)
            .decode(Some(b"[]"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptData);

        let err = RecordCodec::new(&wrapped)
            .decode(Some(br#"{"other": []}"#))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Corrupt data in table 'departments': missing field 'departments'"
        );

        let err = RecordCodec::new(&wrapped)
            .decode(Some(br#"{"departments": {}}"#))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptData);
    }

    #[test]
    fn test_should_encode_with_four_space_indent_and_newline() {
        let table = TableDef::bare("tasks");
        let codec = RecordCodec::new(&table);
        let mut document = codec.empty();
        document.records.push(record(json!({"id": 1, "title": "Fix bug"})));

        let encoded = String::from_utf8(codec.encode(&document).unwrap()).unwrap();
        assert_eq!(
            encoded,
            "[\n    {\n        \"id\": 1,\n        \"title\": \"Fix bug\"\n    }\n]\n"
        );
    }

    #[test]
    fn test_should_encode_empty_tables() {
        let bare = TableDef::bare("tasks");
        let wrapped = TableDef::wrapped("projects", "projects");

        let codec = RecordCodec::new(&bare);
        assert_eq!(codec.encode(&codec.empty()).unwrap(), b"[]\n");

        let codec = RecordCodec::new(&wrapped);
        assert_eq!(
            String::from_utf8(codec.encode(&codec.empty()).unwrap()).unwrap(),
            "{\n    \"projects\": []\n}\n"
        );
    }

    #[test]
    fn test_should_keep_field_order() {
        let table = TableDef::bare("users");
        let codec = RecordCodec::new(&table);

        let source = br#"[{"id": 1, "zeta": 1, "alpha": 2, "mid": 3}]"#;
        let document = codec.decode(Some(source)).unwrap();
        let keys: Vec<_> = document.records[0].keys().cloned().collect();
        assert_eq!(keys, vec!["id", "zeta", "alpha", "mid"]);

        let encoded = codec.encode(&document).unwrap();
        let decoded = codec.decode(Some(&encoded)).unwrap();
        let keys: Vec<_> = decoded.records[0].keys().cloned().collect();
        assert_eq!(keys, vec!["id", "zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_should_preserve_envelope_siblings() {
        let table = TableDef::wrapped("reports", "audit_logs");
        let codec = RecordCodec::new(&table);

        let source = br#"{"version": 2, "audit_logs": [{"id": 1}], "generated_by": "cron"}"#;
        let mut document = codec.decode(Some(source)).unwrap();
        document.records.push(record(json!({"id": 2})));

        let encoded = codec.encode(&document).unwrap();
        let value: Value = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(
            value,
            json!({"version": 2, "audit_logs": [{"id": 1}, {"id": 2}], "generated_by": "cron"})
        );
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["version", "audit_logs", "generated_by"]);
    }
}
