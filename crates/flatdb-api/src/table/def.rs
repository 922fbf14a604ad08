use lazy_regex::{Lazy, Regex, lazy_regex};
use serde::{Deserialize, Serialize};

use crate::prelude::{FlatDbError, FlatDbResult};

static TABLE_NAME_REGEX: Lazy<Regex> = lazy_regex!(r"^[A-Za-z0-9_-]+$");

/// How the records of a table are laid out in its JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Layout {
    /// The file is a bare JSON array of records.
    #[default]
    Bare,
    /// The file is an object holding the records in the array `field`.
    ///
    /// Any other key of the envelope object is kept untouched across rewrites.
    Wrapped { field: String },
}

/// How the store assigns the `id` of newly inserted records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IdStrategy {
    /// Integer ids, `max(existing) + 1`, starting from `1`.
    #[default]
    Sequential,
    /// `prefix` followed by `len` random lowercase hex characters.
    Random { prefix: String, len: usize },
}

/// Definition of a table registered in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub id_strategy: IdStrategy,
}

impl TableDef {
    /// Creates a table stored as a bare array with sequential ids.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layout: Layout::Bare,
            id_strategy: IdStrategy::Sequential,
        }
    }

    /// Creates a table stored under `field` of an envelope object, with sequential ids.
    pub fn wrapped(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layout: Layout::Wrapped {
                field: field.into(),
            },
            id_strategy: IdStrategy::Sequential,
        }
    }

    /// Sets the id strategy of the table.
    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    /// Name of the data file, relative to the data directory.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.name)
    }

    /// Name of the companion lock file, relative to the data directory.
    pub fn lock_file_name(&self) -> String {
        format!("{}.json.lock", self.name)
    }
}

/// Checks that `name` is a valid table name, made only of `[A-Za-z0-9_-]`.
pub fn validate_table_name(name: &str) -> FlatDbResult<()> {
    if TABLE_NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(FlatDbError::UnknownTable(name.to_string()))
    }
}
