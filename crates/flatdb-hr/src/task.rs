use flatdb_api::prelude::{
    Conditions, DueDateValidator, FlatDbError, FlatDbResult, NonNegativeValidator,
    OneOfValidator, RecordId, Sanitize as _, TableStore, TrimSanitizer, Validate as _,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::catalog::TASKS;
use crate::fields::{fetch, from_records, impl_try_from_record, max_len, required, to_record};

/// Maximum length of a task title, in characters.
pub const MAX_TITLE_LEN: usize = 255;

pub const TASK_PRIORITIES: &[&str] = &["low", "medium", "high"];
pub const TASK_STATUSES: &[&str] = &["pending", "in_progress", "completed"];

fn default_priority() -> String {
    "medium".to_string()
}

fn default_status() -> String {
    "pending".to_string()
}

/// A task, as stored in the `tasks` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assignee: Option<RecordId>,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(rename = "dueDate", default)]
    pub due_date: Option<String>,
    #[serde(rename = "estimatedHours", default)]
    pub estimated_hours: f64,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl_try_from_record!(Task, TASKS);

/// Payload of a new task.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub assignee: RecordId,
    pub priority: String,
    /// Due date, formatted as `YYYY-MM-DDTHH:MM`.
    pub due_date: String,
    pub estimated_hours: f64,
}

impl NewTask {
    pub fn validate(&self) -> FlatDbResult<()> {
        validate_title(&self.title)?;
        required("description", &self.description)?;
        validate_priority(&self.priority)?;
        validate_due_date(&self.due_date)?;
        validate_estimated_hours(self.estimated_hours)
    }
}

/// Changes to apply to a task. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<RecordId>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
    pub estimated_hours: Option<f64>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Validates the patch and converts it to the fields to merge into the stored task.
    fn into_fields(self) -> FlatDbResult<serde_json::Map<String, Value>> {
        if self.is_empty() {
            return Err(FlatDbError::Validation(
                "No fields provided for update".to_string(),
            ));
        }

        let mut fields = serde_json::Map::new();
        if let Some(title) = self.title {
            validate_title(&title)?;
            fields.insert("title".to_string(), TrimSanitizer.sanitize(Value::from(title))?);
        }
        if let Some(description) = self.description {
            required("description", &description)?;
            fields.insert(
                "description".to_string(),
                TrimSanitizer.sanitize(Value::from(description))?,
            );
        }
        if let Some(assignee) = self.assignee {
            fields.insert("assignee".to_string(), assignee.to_value());
        }
        if let Some(priority) = self.priority {
            validate_priority(&priority)?;
            fields.insert("priority".to_string(), Value::from(priority));
        }
        if let Some(due_date) = self.due_date {
            validate_due_date(&due_date)?;
            fields.insert("dueDate".to_string(), Value::from(due_date));
        }
        if let Some(status) = self.status {
            OneOfValidator(TASK_STATUSES).validate(&Value::from(status.as_str()))?;
            fields.insert("status".to_string(), Value::from(status));
        }
        if let Some(estimated_hours) = self.estimated_hours {
            validate_estimated_hours(estimated_hours)?;
            fields.insert("estimatedHours".to_string(), Value::from(estimated_hours));
        }

        Ok(fields)
    }
}

fn validate_title(title: &str) -> FlatDbResult<()> {
    required("title", title)?;
    max_len("title", title, MAX_TITLE_LEN)
}

fn validate_priority(priority: &str) -> FlatDbResult<()> {
    OneOfValidator(TASK_PRIORITIES).validate(&Value::from(priority))
}

fn validate_due_date(due_date: &str) -> FlatDbResult<()> {
    DueDateValidator
        .validate(&Value::from(due_date))
        .map_err(|_| FlatDbError::Validation("Invalid Due Date format. Use YYYY-MM-DDTHH:MM".to_string()))
}

fn validate_estimated_hours(hours: f64) -> FlatDbResult<()> {
    NonNegativeValidator
        .validate(&Value::from(hours))
        .map_err(|_| {
            FlatDbError::Validation("Estimated Hours must be a non-negative number.".to_string())
        })
}

/// Validates and stores a new task, created by `created_by`.
///
/// New tasks are always `pending`.
pub fn create_task(
    store: &impl TableStore,
    task: NewTask,
    created_by: &str,
) -> FlatDbResult<Task> {
    task.validate()?;

    let fields = to_record(&json!({
        "title": TrimSanitizer.sanitize(Value::from(task.title))?,
        "description": TrimSanitizer.sanitize(Value::from(task.description))?,
        "assignee": task.assignee,
        "priority": task.priority,
        "dueDate": task.due_date,
        "estimatedHours": task.estimated_hours,
        "status": default_status(),
        "created_by": created_by,
    }))?;
    let id = store.insert(TASKS, fields)?;
    debug!(%id, "task created");

    fetch(store, TASKS, &id)
}

/// Applies `patch` to the task `id`.
///
/// Returns [`None`] if the task doesn't exist.
pub fn update_task(
    store: &impl TableStore,
    id: i64,
    patch: TaskPatch,
) -> FlatDbResult<Option<Task>> {
    let fields = patch.into_fields()?;
    let id = RecordId::Int(id);
    if !store.update(TASKS, &id, fields)? {
        return Ok(None);
    }

    fetch(store, TASKS, &id).map(Some)
}

pub fn delete_task(store: &impl TableStore, id: i64) -> FlatDbResult<bool> {
    store.delete(TASKS, &RecordId::Int(id))
}

pub fn tasks_by_status(store: &impl TableStore, status: &str) -> FlatDbResult<Vec<Task>> {
    from_records(TASKS, store.query(TASKS, &Conditions::eq("status", status))?)
}

pub fn tasks_for_assignee(store: &impl TableStore, assignee: &RecordId) -> FlatDbResult<Vec<Task>> {
    from_records(
        TASKS,
        store.query(TASKS, &Conditions::eq("assignee", assignee.to_value()))?,
    )
}
