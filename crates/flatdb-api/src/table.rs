//! This module contains types related to table definitions and records.

mod def;
mod record;

pub use self::def::{IdStrategy, Layout, TableDef, validate_table_name};
pub use self::record::{CREATED_AT_FIELD, ID_FIELD, Record, RecordId, UPDATED_AT_FIELD};
