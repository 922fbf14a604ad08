use flatdb_api::prelude::{IdStrategy, TableDef};

pub const USERS: &str = "users";
pub const TASKS: &str = "tasks";
pub const TEAMS: &str = "teams";
pub const TEMPLATES: &str = "templates";
pub const DEPARTMENTS: &str = "departments";
pub const NOTIFICATIONS: &str = "notifications";
pub const PROJECTS: &str = "projects";
/// Holds the audit log, under the `audit_logs` field.
pub const REPORTS: &str = "reports";

/// Returns the definitions of the tables of the HR application.
pub fn catalog() -> Vec<TableDef> {
    vec![
        TableDef::bare(USERS),
        TableDef::bare(TASKS),
        TableDef::bare(TEAMS),
        TableDef::bare(TEMPLATES),
        TableDef::wrapped(DEPARTMENTS, "departments").with_id_strategy(IdStrategy::Random {
            prefix: "dept".to_string(),
            len: 6,
        }),
        TableDef::wrapped(NOTIFICATIONS, "notifications"),
        TableDef::wrapped(PROJECTS, "projects").with_id_strategy(IdStrategy::Random {
            prefix: "proj".to_string(),
            len: 13,
        }),
        TableDef::wrapped(REPORTS, "audit_logs"),
    ]
}
