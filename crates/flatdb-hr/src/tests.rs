//! Fixtures shared by the view tests.

use std::time::Duration;

use flatdb::prelude::{JsonTableStore, StoreConfig};
use tempfile::TempDir;

use crate::catalog;

/// Opens a store with the HR catalog in a fresh temporary directory.
pub fn open_store() -> (TempDir, JsonTableStore) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let config = StoreConfig::builder(dir.path())
        .tables(catalog())
        .max_attempts(50)
        .retry_interval(Duration::from_millis(10))
        .build()
        .expect("invalid config");
    let store = JsonTableStore::open(config).expect("failed to open store");

    (dir, store)
}
