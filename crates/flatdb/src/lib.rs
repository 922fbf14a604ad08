#![crate_name = "flatdb"]
#![crate_type = "lib"]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # flatdb
//!
//! An embedded document store keeping each table in a flat JSON file.
//!
//! Concurrent writers are serialized per table, first by an in-process lock and then by an
//! advisory lock on a companion `<table>.json.lock` file, so that threads and processes sharing
//! the data directory never lose each other's writes. Tables are always rewritten atomically.
//!
//! ```rust,no_run
//! use flatdb::prelude::*;
//! use serde_json::json;
//!
//! let config = StoreConfig::builder("data")
//!     .table(TableDef::bare("tasks"))
//!     .build()?;
//! let store = JsonTableStore::open(config)?;
//!
//! let fields = json!({"title": "Fix bug", "status": "pending"});
//! let id = store.insert("tasks", fields.as_object().cloned().unwrap_or_default())?;
//! let pending = store.query("tasks", &Conditions::eq("status", "pending"))?;
//! assert_eq!(pending.len(), 1);
//! store.update("tasks", &id, json!({"status": "completed"}).as_object().cloned().unwrap_or_default())?;
//! # Ok::<(), FlatDbError>(())
//! ```

mod codec;
mod config;
mod ids;
mod lock;
mod persist;
pub mod prelude;
mod store;
