//! The JSON table store engine.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use flatdb_api::prelude::{
    CREATED_AT_FIELD, Conditions, FlatDbError, FlatDbResult, ID_FIELD, Record, RecordId,
    TableDef, TableStore, UPDATED_AT_FIELD, now_timestamp, validate_table_name,
};
use serde_json::Value;
use tracing::{debug, trace};

use crate::codec::{RecordCodec, TableDocument};
use crate::config::StoreConfig;
use crate::ids::next_id;
use crate::lock::LockManager;
use crate::persist::{read_file, write_atomic};


/// Embedded store keeping each table in its own JSON file.
///
/// Every operation is one critical section on its table: the table lock is acquired, the whole
/// file is read, the change is applied in memory, the whole file is written atomically and the
/// lock is released. Nothing is cached between operations.
///
/// The store is [`Send`] and [`Sync`]; share it by reference or behind an [`std::sync::Arc`].
#[derive(Debug)]
pub struct JsonTableStore {
    data_dir: PathBuf,
    tables: Vec<TableDef>,
    locks: LockManager,
}

/// A table resolved for the duration of one operation.
struct Table<'a> {
    def: &'a TableDef,
    path: PathBuf,
}

impl Table<'_> {
    fn codec(&self) -> RecordCodec<'_> {
        RecordCodec::new(self.def)
    }

    /// Loads the document, and whether the file exists.
    fn load(&self) -> FlatDbResult<(TableDocument, bool)> {
        let bytes = read_file(&self.path).map_err(|err| FlatDbError::ReadFailed {
            table: self.def.name.clone(),
            source: err,
        })?;
        let exists = bytes.is_some();
        let document = self.codec().decode(bytes.as_deref())?;

        Ok((document, exists))
    }

    fn save(&self, document: &TableDocument) -> FlatDbResult<()> {
        let bytes = self.codec().encode(document)?;
        write_atomic(&self.path, &bytes).map_err(|err| FlatDbError::WriteFailed {
            table: self.def.name.clone(),
            source: err,
        })?;
        trace!(
            table = %self.def.name,
            records = document.records.len(),
            "table written"
        );

        Ok(())
    }
}

impl JsonTableStore {
    /// Opens the store described by `config`.
    ///
    /// The data directory is created if needed, and an empty collection file is written for
    /// every registered table which has none.
    pub fn open(config: StoreConfig) -> FlatDbResult<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.data_dir).map_err(|err| {
            FlatDbError::Config(format!(
                "cannot create data directory {}: {err}",
                config.data_dir.display()
            ))
        })?;

        let locks = LockManager::new(&config.data_dir, config.lock, &config.tables);
        let store = Self {
            data_dir: config.data_dir,
            tables: config.tables,
            locks,
        };

        for def in &store.tables {
            store.critical_section(&def.name, |table| {
                let (document, exists) = table.load()?;
                if !exists {
                    debug!(table = %def.name, "creating empty table file");
                    table.save(&document)?;
                }
                Ok(())
            })?;
        }
        debug!(
            data_dir = %store.data_dir.display(),
            tables = store.tables.len(),
            "store opened"
        );

        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Names of the registered tables, in registration order.
    pub fn tables(&self) -> Vec<&str> {
        self.tables.iter().map(|def| def.name.as_str()).collect()
    }

    /// Returns the definition of a registered table.
    pub fn table_def(&self, table: &str) -> FlatDbResult<&TableDef> {
        validate_table_name(table)?;
        self.tables
            .iter()
            .find(|def| def.name == table)
            .ok_or_else(|| FlatDbError::UnknownTable(table.to_string()))
    }

    /// Runs `f` while holding the lock of `table`.
    fn critical_section<T, F>(&self, table: &str, f: F) -> FlatDbResult<T>
    where
        F: FnOnce(&Table<'_>) -> FlatDbResult<T>,
    {
        let def = self.table_def(table)?;
        let _lock = self.locks.acquire(def)?;
        let table = Table {
            def,
            path: self.data_dir.join(def.file_name()),
        };

        f(&table)
    }
}

/// Checks that every record has an id and that ids are pairwise distinct.
fn check_ids(table: &str, records: &[Record]) -> FlatDbResult<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let Some(id) = RecordId::of(record) else {
            return Err(FlatDbError::InvalidRecord(format!(
                "record {index} of table '{table}' has no valid id"
            )));
        };
        if !seen.insert(id.clone()) {
            return Err(FlatDbError::InvalidRecord(format!(
                "duplicate id {id} in table '{table}'"
            )));
        }
    }

    Ok(())
}

/// Appends a new record built from `fields` to `document` and persists it.
fn append_record(
    table: &Table<'_>,
    document: &mut TableDocument,
    fields: Record,
) -> FlatDbResult<RecordId> {
    let id = next_id(&table.def.id_strategy, &document.records)?;
    let now = now_timestamp();

    let mut record = Record::with_capacity(fields.len() + 3);
    record.insert(ID_FIELD.to_string(), id.to_value());
    record.extend(fields.into_iter().filter(|(field, _)| !is_reserved(field)));
    record.insert(CREATED_AT_FIELD.to_string(), Value::from(now.as_str()));
    record.insert(UPDATED_AT_FIELD.to_string(), Value::from(now));

    document.records.push(record);
    table.save(document)?;
    debug!(table = %table.def.name, %id, "record inserted");

    Ok(id)
}

fn is_reserved(field: &str) -> bool {
    matches!(field, ID_FIELD | CREATED_AT_FIELD | UPDATED_AT_FIELD)
}

impl TableStore for JsonTableStore {
    fn query(&self, table: &str, conditions: &Conditions) -> FlatDbResult<Vec<Record>> {
        trace!(table, conditions = conditions.len(), "query");
        self.critical_section(table, |table| {
            let (document, exists) = table.load()?;
            if !exists {
                debug!(table = %table.def.name, "creating empty table file");
                table.save(&document)?;
            }

            Ok(document
                .records
                .into_iter()
                .filter(|record| conditions.matches(record))
                .collect())
        })
    }

    fn insert(&self, table: &str, fields: Record) -> FlatDbResult<RecordId> {
        trace!(table, "insert");
        self.critical_section(table, |table| {
            let (mut document, _) = table.load()?;
            append_record(table, &mut document, fields)
        })
    }

    fn insert_unless(
        &self,
        table: &str,
        conditions: &Conditions,
        fields: Record,
    ) -> FlatDbResult<Option<RecordId>> {
        trace!(table, conditions = conditions.len(), "insert unless");
        self.critical_section(table, |table| {
            let (mut document, _) = table.load()?;
            if document
                .records
                .iter()
                .any(|record| conditions.matches(record))
            {
                debug!(table = %table.def.name, "matching record exists, not inserting");
                return Ok(None);
            }

            append_record(table, &mut document, fields).map(Some)
        })
    }

    fn update(&self, table: &str, id: &RecordId, fields: Record) -> FlatDbResult<bool> {
        trace!(table, %id, "update");
        self.critical_section(table, |table| {
            let (mut document, _) = table.load()?;
            let Some(record) = document
                .records
                .iter_mut()
                .find(|record| id.is_id_of(record))
            else {
                return Ok(false);
            };

            for (field, value) in fields {
                if field == ID_FIELD || field == CREATED_AT_FIELD {
                    continue;
                }
                record.insert(field, value);
            }
            record.insert(UPDATED_AT_FIELD.to_string(), Value::from(now_timestamp()));

            table.save(&document)?;
            debug!(table = %table.def.name, %id, "record updated");

            Ok(true)
        })
    }

    fn delete(&self, table: &str, id: &RecordId) -> FlatDbResult<bool> {
        trace!(table, %id, "delete");
        self.critical_section(table, |table| {
            let (mut document, _) = table.load()?;
            let Some(index) = document
                .records
                .iter()
                .position(|record| id.is_id_of(record))
            else {
                return Ok(false);
            };

            document.records.remove(index);
            table.save(&document)?;
            debug!(table = %table.def.name, %id, "record deleted");

            Ok(true)
        })
    }

    fn replace(&self, table: &str, records: Vec<Record>) -> FlatDbResult<()> {
        trace!(table, records = records.len(), "replace");
        check_ids(table, &records)?;
        self.critical_section(table, |table| {
            // loaded for the envelope of wrapped tables
            let (mut document, _) = table.load()?;
            document.records = records;
            table.save(&document)
        })
    }

    fn modify<T, F>(&self, table: &str, f: F) -> FlatDbResult<T>
    where
        F: FnOnce(&mut Vec<Record>) -> FlatDbResult<T>,
    {
        trace!(table, "modify");
        self.critical_section(table, |table| {
            let (mut document, _) = table.load()?;
            let original = document.records.clone();

            let output = f(&mut document.records)?;
            if document.records != original {
                check_ids(&table.def.name, &document.records)?;
                table.save(&document)?;
                debug!(table = %table.def.name, "table modified");
            }

            Ok(output)
        })
    }

    fn get(&self, table: &str, id: &RecordId) -> FlatDbResult<Option<Record>> {
        trace!(table, %id, "get");
        self.critical_section(table, |table| {
            let (document, _) = table.load()?;
            Ok(document
                .records
                .into_iter()
                .find(|record| id.is_id_of(record)))
        })
    }

    fn count(&self, table: &str) -> FlatDbResult<usize> {
        trace!(table, "count");
        self.critical_section(table, |table| {
            let (document, _) = table.load()?;
            Ok(document.records.len())
        })
    }
}
