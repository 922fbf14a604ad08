use flatdb_api::prelude::{
    Conditions, FlatDbError, FlatDbResult, RecordId, TableStore, TrimSanitizer, UPDATED_AT_FIELD,
    Sanitize as _, now_timestamp,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::{TEAMS, USERS};
use crate::fields::{fetch, from_record, from_records, impl_try_from_record, required, to_record};
use crate::user::User;

/// The lead of a team, denormalized from the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamLead {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamMetrics {
    #[serde(default)]
    pub tasks: i64,
    #[serde(default)]
    pub completed: i64,
    #[serde(rename = "onTime", default)]
    pub on_time: i64,
    #[serde(default)]
    pub efficiency: f64,
}

/// A team, as stored in the `teams` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub department: String,
    pub lead: TeamLead,
    /// User ids of the members.
    #[serde(default)]
    pub members: Vec<i64>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub metrics: TeamMetrics,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl_try_from_record!(Team, TEAMS);

/// Payload to create or edit a team. Users are referenced by username.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamInput {
    pub name: String,
    pub description: String,
    pub department: String,
    pub lead: String,
    pub members: Vec<String>,
    pub status: String,
}

/// The team fields resolved against the `users` table.
#[derive(Serialize)]
struct ResolvedTeam {
    name: String,
    description: String,
    department: String,
    lead: TeamLead,
    members: Vec<i64>,
    status: String,
}

impl TeamInput {
    fn resolve(self, store: &impl TableStore) -> FlatDbResult<ResolvedTeam> {
        required("name", &self.name)?;
        required("department", &self.department)?;

        let lead = find_user_by_username(store, &self.lead)?.ok_or_else(|| {
            FlatDbError::Validation("Invalid team lead selected".to_string())
        })?;

        let mut members = Vec::with_capacity(self.members.len());
        for username in &self.members {
            match find_user_by_username(store, username)? {
                Some(user) => members.push(user.id),
                None => warn!(username, "unknown team member skipped"),
            }
        }

        Ok(ResolvedTeam {
            name: trimmed(self.name)?,
            description: trimmed(self.description)?,
            department: self.department,
            lead: TeamLead {
                id: lead.id,
                name: lead.display_name(),
            },
            members,
            status: self.status,
        })
    }
}

fn trimmed(text: String) -> FlatDbResult<String> {
    match TrimSanitizer.sanitize(Value::from(text))? {
        Value::String(text) => Ok(text),
        other => Ok(other.to_string()),
    }
}

fn find_user_by_username(store: &impl TableStore, username: &str) -> FlatDbResult<Option<User>> {
    let users: Vec<User> = from_records(
        USERS,
        store.query(USERS, &Conditions::eq("username", username))?,
    )?;
    Ok(users.into_iter().next())
}

/// Creates a team, resolving the lead and the members by username.
///
/// Unknown members are skipped; an unknown lead fails with [`FlatDbError::Validation`].
pub fn create_team(store: &impl TableStore, team: TeamInput) -> FlatDbResult<Team> {
    let team = team.resolve(store)?;
    let mut fields = to_record(&team)?;
    fields.insert(
        "metrics".to_string(),
        serde_json::to_value(TeamMetrics::default())
            .map_err(|err| FlatDbError::InvalidRecord(err.to_string()))?,
    );

    let id = store.insert(TEAMS, fields)?;
    debug!(%id, members = team.members.len(), "team created");

    fetch(store, TEAMS, &id)
}

/// Rewrites the team `id` with `team`, in a single critical section on `teams`.
///
/// Returns [`None`] if the team doesn't exist.
pub fn edit_team(store: &impl TableStore, id: i64, team: TeamInput) -> FlatDbResult<Option<Team>> {
    let team = team.resolve(store)?;
    let fields = to_record(&team)?;
    let id = RecordId::Int(id);

    store.modify(TEAMS, |records| {
        let Some(record) = records.iter_mut().find(|record| id.is_id_of(record)) else {
            return Ok(None);
        };
        record.extend(fields);
        record.insert(UPDATED_AT_FIELD.to_string(), Value::from(now_timestamp()));

        from_record(TEAMS, record.clone()).map(Some)
    })
}

pub fn delete_team(store: &impl TableStore, id: i64) -> FlatDbResult<bool> {
    store.delete(TEAMS, &RecordId::Int(id))
}

/// Removes the user `user_id` from the members of every team.
///
/// Returns the number of teams which were changed.
pub fn remove_member_from_teams(store: &impl TableStore, user_id: i64) -> FlatDbResult<usize> {
    store.modify(TEAMS, |records| {
        let mut changed = 0;
        for record in records.iter_mut() {
            let Some(Value::Array(members)) = record.get_mut("members") else {
                continue;
            };
            let before = members.len();
            members.retain(|member| member.as_i64() != Some(user_id));
            if members.len() != before {
                changed += 1;
                record.insert(UPDATED_AT_FIELD.to_string(), Value::from(now_timestamp()));
            }
        }

        Ok(changed)
    })
}
