//! Per-table locking.
//!
//! A table is locked in two steps:
//!
//! 1. an in-process gate, one [`parking_lot::Mutex`] per table, which serializes the threads of
//!    this process;
//! 2. an advisory exclusive lock on the companion file `<table>.json.lock`, which serializes
//!    processes sharing the data directory.
//!
//! Both steps are bounded by the [`LockConfig`] retry budget.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;

use flatdb_api::prelude::{FlatDbError, FlatDbResult, TableDef};
use fs2::FileExt;
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace, warn};

use crate::config::LockConfig;

/// Hands out [`TableLock`]s for the tables of a data directory.
#[derive(Debug)]
pub struct LockManager {
    dir: PathBuf,
    config: LockConfig,
    gates: HashMap<String, Mutex<()>>,
}

impl LockManager {
    /// Creates a lock manager for the given tables.
    ///
    /// The set of lockable tables is fixed for the lifetime of the manager.
    pub fn new<'a>(
        dir: impl Into<PathBuf>,
        config: LockConfig,
        tables: impl IntoIterator<Item = &'a TableDef>,
    ) -> Self {
        Self {
            dir: dir.into(),
            config,
            gates: tables
                .into_iter()
                .map(|def| (def.name.clone(), Mutex::new(())))
                .collect(),
        }
    }

    /// Acquires the lock of `table`.
    ///
    /// Fails with [`FlatDbError::LockTimeout`] when the lock can't be obtained within the retry
    /// budget.
    pub fn acquire(&self, table: &TableDef) -> FlatDbResult<TableLock<'_>> {
        let gate = self
            .gates
            .get(&table.name)
            .ok_or_else(|| FlatDbError::UnknownTable(table.name.clone()))?;

        let Some(gate) = gate.try_lock_for(self.config.budget()) else {
            warn!(
                table = %table.name,
                "timed out waiting for the in-process table lock"
            );
            return Err(self.timeout(table, 0));
        };

        let file = self.open_lock_file(table)?;
        for attempt in 1..=self.config.max_attempts {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => {
                    if attempt > 1 {
                        debug!(table = %table.name, attempt, "table lock acquired after retrying");
                    } else {
                        trace!(table = %table.name, "table lock acquired");
                    }
                    return Ok(TableLock {
                        table: table.name.clone(),
                        file,
                        _gate: gate,
                    });
                }
                Err(err) if is_contended(&err) => {
                    debug!(table = %table.name, attempt, "table lock is held by another process");
                    if attempt < self.config.max_attempts {
                        std::thread::sleep(self.config.retry_interval());
                    }
                }
                Err(err) => {
                    return Err(FlatDbError::LockFailed {
                        table: table.name.clone(),
                        source: err,
                    });
                }
            }
        }

        warn!(
            table = %table.name,
            attempts = self.config.max_attempts,
            "could not acquire table lock"
        );
        Err(self.timeout(table, self.config.max_attempts))
    }

    fn open_lock_file(&self, table: &TableDef) -> FlatDbResult<File> {
        let path = self.lock_path(table);
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|err| FlatDbError::LockFailed {
                table: table.name.clone(),
                source: err,
            })
    }

    fn lock_path(&self, table: &TableDef) -> PathBuf {
        self.dir.join(table.lock_file_name())
    }

    fn timeout(&self, table: &TableDef, attempts: u32) -> FlatDbError {
        FlatDbError::LockTimeout {
            table: table.name.clone(),
            attempts,
        }
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || (err.raw_os_error().is_some()
            && err.raw_os_error() == fs2::lock_contended_error().raw_os_error())
}

/// Exclusive lock on a table, released on drop.
///
/// The file lock is released before the in-process gate, so that the next thread of this
/// process never finds the file still locked by us.
#[derive(Debug)]
pub struct TableLock<'a> {
    table: String,
    file: File,
    _gate: MutexGuard<'a, ()>,
}

impl TableLock<'_> {
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl Drop for TableLock<'_> {
    fn drop(&mut self) {
        // `File::unlock` from std would shadow the trait method
        if let Err(err) = FileExt::unlock(&self.file) {
            warn!(table = %self.table, "failed to release table lock: {err}");
        } else {
            trace!(table = %self.table, "table lock released");
        }
    }
}

#[cfg(test)]
mod tests {

    use std::path::Path;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    use flatdb_api::prelude::ErrorKind;
    use tempfile::TempDir;

    use super::*;

    fn manager(dir: &Path, max_attempts: u32, retry_interval_ms: u64) -> LockManager {
        LockManager::new(
            dir,
            LockConfig {
                max_attempts,
                retry_interval_ms,
            },
            &[TableDef::bare("tasks"), TableDef::bare("users")],
        )
    }

    #[test]
    fn test_should_acquire_and_release_lock() {
        let dir = TempDir::new().unwrap();
        let locks = manager(dir.path(), 3, 10);
        let tasks = TableDef::bare("tasks");

        let lock = locks.acquire(&tasks).unwrap();
        assert_eq!(lock.table(), "tasks");
        assert!(dir.path().join("tasks.json.lock").exists());
        drop(lock);

        // released: can be taken again right away
        let _lock = locks.acquire(&tasks).unwrap();
    }

    #[test]
    fn test_should_lock_tables_independently() {
        let dir = TempDir::new().unwrap();
        let locks = manager(dir.path(), 1, 1);

        let _tasks = locks.acquire(&TableDef::bare("tasks")).unwrap();
        let _users = locks.acquire(&TableDef::bare("users")).unwrap();
    }

    #[test]
    fn test_should_time_out_when_file_is_locked_elsewhere() {
        let dir = TempDir::new().unwrap();
        let locks = manager(dir.path(), 3, 10);
        let tasks = TableDef::bare("tasks");

        let foreign = File::create(dir.path().join("tasks.json.lock")).unwrap();
        FileExt::lock_exclusive(&foreign).unwrap();

        let started = Instant::now();
        let err = locks.acquire(&tasks).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LockTimeout);
        assert!(matches!(
            err,
            FlatDbError::LockTimeout { attempts: 3, .. }
        ));
        // two sleeps between three attempts
        assert!(started.elapsed() >= Duration::from_millis(20));

        FileExt::unlock(&foreign).unwrap();
        assert!(locks.acquire(&tasks).is_ok());
    }

    #[test]
    fn test_should_time_out_on_in_process_contention() {
        let dir = TempDir::new().unwrap();
        let locks = manager(dir.path(), 2, 5);
        let tasks = TableDef::bare("tasks");

        let _held = locks.acquire(&tasks).unwrap();
        std::thread::scope(|scope| {
            let handle = scope.spawn(|| locks.acquire(&tasks).map(|_| ()));
            let err = handle.join().unwrap().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::LockTimeout);
            // the lock file was never tried
            assert!(matches!(
                err,
                FlatDbError::LockTimeout { attempts: 0, .. }
            ));
        });
    }

    #[test]
    fn test_should_reject_unknown_table() {
        let dir = TempDir::new().unwrap();
        let locks = manager(dir.path(), 1, 1);

        let err = locks.acquire(&TableDef::bare("payroll")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTable);
    }

    #[test]
    fn test_should_serialize_threads() {
        let dir = TempDir::new().unwrap();
        let locks = Arc::new(manager(dir.path(), 200, 5));
        let inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                std::thread::spawn(move || {
                    let _lock = locks.acquire(&TableDef::bare("tasks")).unwrap();
                    assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                    std::thread::sleep(Duration::from_millis(2));
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
