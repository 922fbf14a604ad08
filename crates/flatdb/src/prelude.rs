//! Re-exports all the most commonly used items from this crate.

pub use flatdb_api::prelude::*;

pub use crate::codec::{RecordCodec, TableDocument};
pub use crate::config::{
    DEFAULT_LOCK_ATTEMPTS, DEFAULT_RETRY_INTERVAL_MS, LockConfig, StoreConfig, StoreConfigBuilder,
};
pub use crate::lock::{LockManager, TableLock};
pub use crate::store::JsonTableStore;
