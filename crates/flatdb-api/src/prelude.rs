//! Prelude exposes all the types for `flatdb-api` crate.

pub use crate::error::{ErrorKind, FlatDbError, FlatDbResult};
pub use crate::query::{Conditions, loose_eq};
pub use crate::sanitize::*;
pub use crate::store::TableStore;
pub use crate::table::{
    CREATED_AT_FIELD, ID_FIELD, IdStrategy, Layout, Record, RecordId, TableDef, UPDATED_AT_FIELD,
    validate_table_name,
};
pub use crate::utils::{TIMESTAMP_FORMAT, now_timestamp};
pub use crate::validate::*;
