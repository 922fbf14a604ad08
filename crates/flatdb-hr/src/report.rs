use flatdb_api::prelude::{Conditions, FlatDbResult, RecordId, TableStore};
use serde::{Deserialize, Serialize};

use crate::catalog::REPORTS;
use crate::fields::{from_records, impl_try_from_record};

/// An entry of the audit log kept in the `reports` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub action: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub user_email: String,
}

impl_try_from_record!(AuditLog, REPORTS);

/// Lists the audit log, in file order.
pub fn audit_logs(store: &impl TableStore) -> FlatDbResult<Vec<AuditLog>> {
    from_records(REPORTS, store.query(REPORTS, &Conditions::all())?)
}

/// Lists the audit log entries of type `kind`.
pub fn audit_logs_of_type(store: &impl TableStore, kind: &str) -> FlatDbResult<Vec<AuditLog>> {
    from_records(REPORTS, store.query(REPORTS, &Conditions::eq("type", kind))?)
}
