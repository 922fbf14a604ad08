//! Store configuration.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use flatdb_api::prelude::{FlatDbError, FlatDbResult, IdStrategy, Layout, TableDef};
use serde::{Deserialize, Serialize};

/// Default number of lock attempts before giving up.
pub const DEFAULT_LOCK_ATTEMPTS: u32 = 10;
/// Default sleep between two lock attempts, in milliseconds.
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 100;
/// Maximum length of the random part of a [`IdStrategy::Random`] identifier.
pub const MAX_RANDOM_ID_LEN: usize = 64;

/// Lock acquisition settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// How many times the table lock is tried before failing with a lock timeout.
    pub max_attempts: u32,
    /// Sleep between two attempts, in milliseconds.
    pub retry_interval_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_LOCK_ATTEMPTS,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
        }
    }
}

impl LockConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    /// Total time a caller may wait for a table lock.
    pub fn budget(&self) -> Duration {
        self.retry_interval()
            .saturating_mul(self.max_attempts)
    }
}

/// Configuration of a [`crate::prelude::JsonTableStore`].
///
/// Host applications can embed it in their own JSON configuration:
///
/// ```json
/// {
///     "data_dir": "/var/lib/hr/data",
///     "lock": { "max_attempts": 10, "retry_interval_ms": 100 },
///     "tables": [
///         { "name": "users" },
///         { "name": "departments", "layout": { "type": "wrapped", "field": "departments" } }
///     ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    #[serde(default)]
    pub lock: LockConfig,
    #[serde(default)]
    pub tables: Vec<TableDef>,
}

impl StoreConfig {
    /// Starts building a configuration rooted at `data_dir`.
    pub fn builder(data_dir: impl Into<PathBuf>) -> StoreConfigBuilder {
        StoreConfigBuilder {
            config: StoreConfig {
                data_dir: data_dir.into(),
                lock: LockConfig::default(),
                tables: Vec::new(),
            },
        }
    }

    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> FlatDbResult<Self> {
        let config: StoreConfig = serde_json::from_str(json)
            .map_err(|err| FlatDbError::Config(format!("invalid store configuration: {err}")))?;
        config.validate()?;

        Ok(config)
    }

    /// Reads, parses and validates a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> FlatDbResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| {
            FlatDbError::Config(format!("cannot read {}: {err}", path.display()))
        })?;

        Self::from_json_str(&json)
    }

    /// Returns the definition of the table named `name`, if registered.
    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|def| def.name == name)
    }

    /// Checks the configuration for inconsistencies.
    pub fn validate(&self) -> FlatDbResult<()> {
        if self.lock.max_attempts == 0 {
            return Err(FlatDbError::Config(
                "lock.max_attempts must be at least 1".to_string(),
            ));
        }

        let mut names = HashSet::with_capacity(self.tables.len());
        for def in &self.tables {
            flatdb_api::prelude::validate_table_name(&def.name).map_err(|_| {
                FlatDbError::Config(format!("invalid table name '{}'", def.name))
            })?;
            if !names.insert(def.name.as_str()) {
                return Err(FlatDbError::Config(format!(
                    "table '{}' is registered twice",
                    def.name
                )));
            }
            if let Layout::Wrapped { field } = &def.layout
                && field.is_empty()
            {
                return Err(FlatDbError::Config(format!(
                    "table '{}' has an empty wrapping field",
                    def.name
                )));
            }
            if let IdStrategy::Random { len, .. } = &def.id_strategy
                && !(1..=MAX_RANDOM_ID_LEN).contains(len)
            {
                return Err(FlatDbError::Config(format!(
                    "table '{}' random id length must be between 1 and {MAX_RANDOM_ID_LEN}",
                    def.name
                )));
            }
        }

        Ok(())
    }
}

/// Builder for [`StoreConfig`].
#[derive(Debug, Clone)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Registers a table.
    pub fn table(mut self, def: TableDef) -> Self {
        self.config.tables.push(def);
        self
    }

    /// Registers many tables.
    pub fn tables(mut self, defs: impl IntoIterator<Item = TableDef>) -> Self {
        self.config.tables.extend(defs);
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.lock.max_attempts = max_attempts;
        self
    }

    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.config.lock.retry_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> FlatDbResult<StoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
