#![crate_name = "flatdb_hr"]
#![crate_type = "lib"]

//! # flatdb HR
//!
//! Typed views over the tables of the HR application.
//!
//! Records are validated when they cross the boundary between the store and a feature: incoming
//! payloads when they are converted to record fields, stored records through `TryFrom<Record>`. Every helper takes any [`TableStore`](flatdb_api::prelude::TableStore), so
//! the features can be exercised against any store implementation.

mod catalog;
mod department;
mod fields;
mod notification;
mod project;
mod report;
mod task;
mod team;
#[cfg(test)]
mod tests;
mod user;

pub use self::catalog::{
    DEPARTMENTS, NOTIFICATIONS, PROJECTS, REPORTS, TASKS, TEAMS, TEMPLATES, USERS, catalog,
};
pub use self::department::{
    Department, DepartmentInput, create_department, delete_department, list_departments,
    update_department,
};
pub use self::notification::{
    NewNotification, Notification, create_notification, delete_notification, mark_as_read,
    unread_notifications,
};
pub use self::project::{
    Project, ProjectInput, create_project, delete_project, list_projects, update_project,
};
pub use self::report::{AuditLog, audit_logs, audit_logs_of_type};
pub use self::task::{
    NewTask, Task, TaskPatch, create_task, delete_task, tasks_by_status, tasks_for_assignee,
    update_task,
};
pub use self::team::{
    Team, TeamInput, TeamLead, TeamMetrics, create_team, delete_team, edit_team,
    remove_member_from_teams,
};
pub use self::user::{
    Access, NewUser, Permissions, Role, User, UserInput, add_user, edit_user, find_user_by_email,
    login, record_login, register_user, toggle_user_status, update_permissions,
};
