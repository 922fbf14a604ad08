use flatdb_api::prelude::{
    ClampSanitizer, Conditions, FlatDbError, FlatDbResult, NonNegativeValidator,
    NullIfEmptySanitizer, Record, RecordId, Sanitize as _, TableStore, UPDATED_AT_FIELD,
    Validate as _, now_timestamp,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::catalog::PROJECTS;
use crate::fields::{fetch, from_record, from_records, impl_try_from_record, required};

const PROGRESS: ClampSanitizer = ClampSanitizer { min: 0, max: 100 };

fn default_status() -> String {
    "Planning".to_string()
}

fn default_priority() -> String {
    "medium".to_string()
}

/// A project, as stored in the `projects` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub manager_id: Option<i64>,
    #[serde(default)]
    pub team_members: Vec<i64>,
    #[serde(default)]
    pub progress: i64,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl_try_from_record!(Project, PROJECTS);

/// Payload to create or update a project.
///
/// On update, only the provided fields are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub budget: Option<f64>,
    pub department_id: Option<String>,
    pub manager_id: Option<i64>,
    pub team_members: Option<Vec<i64>>,
    /// Clamped to `0..=100`.
    pub progress: Option<i64>,
    pub priority: Option<String>,
}

impl ProjectInput {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Converts the provided fields to record fields.
    fn into_fields(self) -> FlatDbResult<Record> {
        let mut fields = Record::new();
        if let Some(name) = self.name {
            required("name", &name)?;
            fields.insert("name".to_string(), Value::from(name.trim()));
        }
        if let Some(description) = self.description {
            fields.insert("description".to_string(), Value::from(description.trim()));
        }
        if let Some(status) = self.status {
            fields.insert("status".to_string(), Value::from(status));
        }
        // blank dates are stored as null
        for (field, date) in [("start_date", self.start_date), ("end_date", self.end_date)] {
            if let Some(date) = date {
                fields.insert(
                    field.to_string(),
                    NullIfEmptySanitizer.sanitize(Value::from(date))?,
                );
            }
        }
        if let Some(budget) = self.budget {
            NonNegativeValidator
                .validate(&Value::from(budget))
                .map_err(|_| FlatDbError::Validation("Budget cannot be negative".to_string()))?;
            fields.insert("budget".to_string(), Value::from(budget));
        }
        if let Some(department_id) = self.department_id {
            fields.insert(
                "department_id".to_string(),
                Value::from(department_id.trim()),
            );
        }
        if let Some(manager_id) = self.manager_id {
            fields.insert("manager_id".to_string(), Value::from(manager_id));
        }
        if let Some(team_members) = self.team_members {
            fields.insert("team_members".to_string(), Value::from(team_members));
        }
        if let Some(progress) = self.progress {
            fields.insert(
                "progress".to_string(),
                PROGRESS.sanitize(Value::from(progress))?,
            );
        }
        if let Some(priority) = self.priority {
            fields.insert("priority".to_string(), Value::from(priority));
        }

        Ok(fields)
    }
}

/// Creates a project. Missing optional fields get their defaults.
pub fn create_project(store: &impl TableStore, project: ProjectInput) -> FlatDbResult<Project> {
    if project.name.is_none() {
        return Err(FlatDbError::Validation(
            "Field 'name' is required and cannot be empty".to_string(),
        ));
    }

    let provided = project.into_fields()?;
    let mut fields = Record::new();
    for (field, default) in [
        ("name", Value::Null),
        ("description", Value::from("")),
        ("status", Value::from(default_status())),
        ("start_date", Value::Null),
        ("end_date", Value::Null),
        ("budget", Value::from(0)),
        ("department_id", Value::Null),
        ("manager_id", Value::Null),
        ("team_members", Value::Array(Vec::new())),
        ("progress", Value::from(0)),
        ("priority", Value::from(default_priority())),
    ] {
        let value = provided.get(field).cloned().unwrap_or(default);
        fields.insert(field.to_string(), value);
    }

    let id = store.insert(PROJECTS, fields)?;
    debug!(%id, "project created");

    fetch(store, PROJECTS, &id)
}

/// Writes the provided fields of `project` into the project `id`.
///
/// Returns [`None`] if the project doesn't exist.
pub fn update_project(
    store: &impl TableStore,
    id: &str,
    project: ProjectInput,
) -> FlatDbResult<Option<Project>> {
    if project.is_empty() {
        return Err(FlatDbError::Validation(
            "No fields provided for update".to_string(),
        ));
    }
    let fields = project.into_fields()?;
    let id = RecordId::from(id);

    store.modify(PROJECTS, |records| {
        let Some(record) = records.iter_mut().find(|record| id.is_id_of(record)) else {
            return Ok(None);
        };
        record.extend(fields);
        record.insert(UPDATED_AT_FIELD.to_string(), Value::from(now_timestamp()));

        from_record(PROJECTS, record.clone()).map(Some)
    })
}

pub fn delete_project(store: &impl TableStore, id: &str) -> FlatDbResult<bool> {
    store.delete(PROJECTS, &RecordId::from(id))
}

pub fn list_projects(store: &impl TableStore) -> FlatDbResult<Vec<Project>> {
    from_records(PROJECTS, store.query(PROJECTS, &Conditions::all())?)
}
