use flatdb_api::prelude::{
    Conditions, FlatDbError, FlatDbResult, NonNegativeValidator, RecordId, TableStore,
    Validate as _,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::catalog::DEPARTMENTS;
use crate::fields::{fetch, from_records, impl_try_from_record, max_len, to_record};

/// Maximum length of a department name, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// A department, as stored in the `departments` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub head: String,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub employee_count: i64,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl_try_from_record!(Department, DEPARTMENTS);

/// Payload to create or update a department.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentInput {
    pub name: String,
    pub description: String,
    pub head: String,
    pub budget: f64,
    pub employee_count: i64,
}

impl DepartmentInput {
    pub fn validate(&self) -> FlatDbResult<()> {
        if self.name.trim().is_empty() {
            return Err(FlatDbError::Validation(
                "Department name is required".to_string(),
            ));
        }
        max_len("name", &self.name, MAX_NAME_LEN)?;
        NonNegativeValidator
            .validate(&Value::from(self.budget))
            .map_err(|_| FlatDbError::Validation("Budget cannot be negative".to_string()))?;
        if self.employee_count < 0 {
            return Err(FlatDbError::Validation(
                "Employee count cannot be negative".to_string(),
            ));
        }

        Ok(())
    }

    fn into_fields(self) -> FlatDbResult<flatdb_api::prelude::Record> {
        self.validate()?;
        to_record(&Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            head: self.head.trim().to_string(),
            ..self
        })
    }
}

pub fn create_department(
    store: &impl TableStore,
    department: DepartmentInput,
) -> FlatDbResult<Department> {
    let id = store.insert(DEPARTMENTS, department.into_fields()?)?;
    debug!(%id, "department created");

    fetch(store, DEPARTMENTS, &id)
}

/// Updates the department `id`. Returns `false` if it doesn't exist.
pub fn update_department(
    store: &impl TableStore,
    id: &str,
    department: DepartmentInput,
) -> FlatDbResult<bool> {
    store.update(DEPARTMENTS, &RecordId::from(id), department.into_fields()?)
}

pub fn delete_department(store: &impl TableStore, id: &str) -> FlatDbResult<bool> {
    store.delete(DEPARTMENTS, &RecordId::from(id))
}

pub fn list_departments(store: &impl TableStore) -> FlatDbResult<Vec<Department>> {
    from_records(DEPARTMENTS, store.query(DEPARTMENTS, &Conditions::all())?)
}
