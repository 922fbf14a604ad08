use flatdb_api::prelude::{
    Conditions, EmailValidator, FlatDbError, FlatDbResult, Record, RecordId, TableStore,
    UPDATED_AT_FIELD, Validate as _, now_timestamp,
};
use lazy_regex::regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::catalog::USERS;
use crate::fields::{fetch, from_record, from_records, impl_try_from_record, required, to_record};

/// Role of a user of the HR application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Hr,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Employee => "employee",
        }
    }
}

fn default_status() -> String {
    "active".to_string()
}

/// Department of users created without one.
const NO_DEPARTMENT: &str = "none";

/// Access rights on one area of the application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Access {
    #[serde(default)]
    pub view: bool,
    #[serde(default)]
    pub create: bool,
    #[serde(default)]
    pub edit: bool,
    #[serde(default)]
    pub delete: bool,
}

impl Access {
    const VIEW_ONLY: Self = Self {
        view: true,
        create: false,
        edit: false,
        delete: false,
    };
}

/// Per-area permissions of a user.
///
/// The default grants everything but deletion on tasks, read access to users and reports, and
/// nothing on settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub tasks: Access,
    #[serde(default)]
    pub users: Access,
    #[serde(default)]
    pub reports: Access,
    #[serde(default)]
    pub settings: Access,
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            tasks: Access {
                view: true,
                create: true,
                edit: true,
                delete: false,
            },
            users: Access::VIEW_ONLY,
            reports: Access::VIEW_ONLY,
            settings: Access::default(),
        }
    }
}

/// A user, as stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Role,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub permissions: Option<Permissions>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
}

impl_try_from_record!(User, USERS);

impl User {
    /// Display name of the user: first and last name, or the username if both are blank.
    pub fn display_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }
}

/// Sign up payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    /// Stored as given; hashing is up to the caller.
    pub password: String,
    pub role: Role,
}

impl NewUser {
    pub fn validate(&self) -> FlatDbResult<()> {
        required("username", &self.username)?;
        required("password", &self.password)?;
        validate_email(&self.email)?;
        if self.role == Role::Admin {
            return Err(FlatDbError::Validation("Invalid role selected".to_string()));
        }

        Ok(())
    }
}

/// User payload of the administration page.
#[derive(Debug, Clone, PartialEq)]
pub struct UserInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Required when adding a user. When editing, `None` or a blank password keeps the current one.
    pub password: Option<String>,
    pub role: Role,
    /// Defaults to `none`.
    pub department: Option<String>,
}

impl UserInput {
    pub fn validate(&self) -> FlatDbResult<()> {
        required("firstName", &self.first_name)?;
        required("lastName", &self.last_name)?;
        validate_email(&self.email)
    }

    /// Username derived from the name: `first_last`, lowercase, keeping only `[a-z0-9_]`.
    pub fn username(&self) -> String {
        let username = format!(
            "{}_{}",
            self.first_name.trim(),
            self.last_name.trim()
        )
        .to_lowercase();
        regex!(r"[^a-z0-9_]").replace_all(&username, "").into_owned()
    }

    /// The non-blank password, if any.
    fn password(&self) -> Option<&str> {
        self.password
            .as_deref()
            .filter(|password| !password.trim().is_empty())
    }

    /// Fields written both when adding and when editing a user.
    fn profile_fields(&self) -> FlatDbResult<Record> {
        to_record(&json!({
            "username": self.username(),
            "email": self.email.trim(),
            "firstName": self.first_name.trim(),
            "lastName": self.last_name.trim(),
            "role": self.role,
            "department": self.department.as_deref().unwrap_or(NO_DEPARTMENT),
        }))
    }
}

fn validate_email(email: &str) -> FlatDbResult<()> {
    EmailValidator
        .validate(&Value::from(email.trim()))
        .map_err(|_| FlatDbError::Validation("Invalid email address".to_string()))
}

fn email_taken() -> FlatDbError {
    FlatDbError::Validation("Email already exists".to_string())
}

/// Inserts `fields` into `users` unless the email is already taken, in one critical section.
fn insert_with_unique_email(
    store: &impl TableStore,
    email: &str,
    fields: Record,
) -> FlatDbResult<RecordId> {
    store
        .insert_unless(USERS, &Conditions::eq("email", email), fields)?
        .ok_or_else(email_taken)
}

/// Registers a new `hr` or `employee` user.
///
/// Fails with [`FlatDbError::Validation`] if the email is already taken. The email check and the
/// insert are atomic.
pub fn register_user(store: &impl TableStore, user: NewUser) -> FlatDbResult<User> {
    user.validate()?;

    let fields = to_record(&json!({
        "username": user.username.trim(),
        "email": user.email.trim(),
        "password": user.password,
        "role": user.role,
        "status": default_status(),
        "last_login": Value::Null,
    }))?;
    let id = insert_with_unique_email(store, user.email.trim(), fields)?;
    debug!(%id, role = user.role.as_str(), "user registered");

    fetch(store, USERS, &id)
}

/// Creates a user from the administration page, with the default [`Permissions`].
///
/// Any role can be given. Fails with [`FlatDbError::Validation`] if the email is already taken.
pub fn add_user(store: &impl TableStore, user: UserInput) -> FlatDbResult<User> {
    user.validate()?;
    let Some(password) = user.password() else {
        return Err(FlatDbError::Validation(
            "Field 'password' is required and cannot be empty".to_string(),
        ));
    };

    let mut fields = user.profile_fields()?;
    fields.insert("password".to_string(), Value::from(password));
    fields.insert("status".to_string(), Value::from(default_status()));
    fields.insert("last_login".to_string(), Value::Null);
    fields.insert(
        "permissions".to_string(),
        serde_json::to_value(Permissions::default())
            .map_err(|err| FlatDbError::InvalidRecord(err.to_string()))?,
    );

    let id = insert_with_unique_email(store, user.email.trim(), fields)?;
    debug!(%id, role = user.role.as_str(), "user added");

    fetch(store, USERS, &id)
}

/// Rewrites the profile of the user `id`.
///
/// The email must not belong to another user. The password is replaced only when a non-blank one
/// is given. Returns [`None`] if the user doesn't exist.
pub fn edit_user(store: &impl TableStore, id: i64, user: UserInput) -> FlatDbResult<Option<User>> {
    user.validate()?;
    let mut fields = user.profile_fields()?;
    if let Some(password) = user.password() {
        fields.insert("password".to_string(), Value::from(password));
    }
    let email = user.email.trim();
    let id = RecordId::Int(id);

    store.modify(USERS, |records| {
        let Some(index) = records.iter().position(|record| id.is_id_of(record)) else {
            return Ok(None);
        };
        let taken = records.iter().enumerate().any(|(other, record)| {
            other != index && record.get("email").and_then(Value::as_str) == Some(email)
        });
        if taken {
            return Err(email_taken());
        }

        let record = &mut records[index];
        record.extend(fields);
        record.insert(UPDATED_AT_FIELD.to_string(), Value::from(now_timestamp()));

        from_record(USERS, record.clone()).map(Some)
    })
}

/// Replaces the permissions of the user `id`. Returns `false` if the user doesn't exist.
pub fn update_permissions(
    store: &impl TableStore,
    id: i64,
    permissions: Permissions,
) -> FlatDbResult<bool> {
    let fields = to_record(&json!({ "permissions": permissions }))?;
    store.update(USERS, &RecordId::Int(id), fields)
}

pub fn find_user_by_email(store: &impl TableStore, email: &str) -> FlatDbResult<Option<User>> {
    let records = store.query(USERS, &Conditions::eq("email", email))?;
    let mut users: Vec<User> = from_records(USERS, records)?;
    if users.len() > 1 {
        warn!(email, count = users.len(), "several users share the same email");
    }

    Ok(if users.is_empty() {
        None
    } else {
        Some(users.swap_remove(0))
    })
}

/// Stamps `last_login` of the user `id` with the current time.
pub fn record_login(store: &impl TableStore, id: i64) -> FlatDbResult<bool> {
    let fields = to_record(&json!({ "last_login": now_timestamp() }))?;
    store.update(USERS, &RecordId::Int(id), fields)
}

/// Checks the credentials of a user, and records the login on success.
///
/// Returns [`None`] if there is no user with this email, or if the password or the role don't
/// match.
pub fn login(
    store: &impl TableStore,
    email: &str,
    password: &str,
    role: Role,
) -> FlatDbResult<Option<User>> {
    let Some(user) = find_user_by_email(store, email)? else {
        return Ok(None);
    };
    if user.password != password || user.role != role {
        debug!(email, "login rejected");
        return Ok(None);
    }

    record_login(store, user.id)?;
    fetch(store, USERS, &RecordId::Int(user.id)).map(Some)
}

/// Switches the user `id` between `active` and `inactive`.
///
/// Returns the new status, or [`None`] if the user doesn't exist.
pub fn toggle_user_status(store: &impl TableStore, id: i64) -> FlatDbResult<Option<String>> {
    let id = RecordId::Int(id);
    store.modify(USERS, |records| {
        let Some(record) = records.iter_mut().find(|record| id.is_id_of(record)) else {
            return Ok(None);
        };
        let status = match record.get("status").and_then(Value::as_str) {
            Some("active") | None => "inactive",
            Some(_) => "active",
        };
        record.insert("status".to_string(), Value::from(status));
        record.insert(UPDATED_AT_FIELD.to_string(), Value::from(now_timestamp()));

        Ok(Some(status.to_string()))
    })
}

#[cfg(test)]
mod tests {

    use std::sync::Barrier;

    use flatdb_api::prelude::ErrorKind;

    use super::*;
    use crate::tests::open_store;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            username: "jdoe".to_string(),
            email: email.to_string(),
            password: "secret".to_string(),
            role: Role::Employee,
        }
    }

    #[test]
    fn test_should_register_user() {
        let (_dir, store) = open_store();

        let user = register_user(&store, new_user("jdoe@example.com")).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.role, Role::Employee);
        assert_eq!(user.status, "active");
        assert_eq!(user.last_login, None);
        assert!(user.created_at.is_some());

        let record = store.get(USERS, &RecordId::Int(1)).unwrap().unwrap();
        assert_eq!(record["role"], json!("employee"));
        assert_eq!(record["last_login"], Value::Null);
    }

    #[test]
    fn test_should_reject_duplicate_email() {
        let (_dir, store) = open_store();
        register_user(&store, new_user("jdoe@example.com")).unwrap();

        let err = register_user(&store, new_user("jdoe@example.com")).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Email already exists");
        assert_eq!(store.count(USERS).unwrap(), 1);
    }

    #[test]
    fn test_should_reject_invalid_sign_up() {
        let (_dir, store) = open_store();

        let err = register_user(&store, new_user("not-an-email")).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Invalid email address");

        let mut admin = new_user("root@example.com");
        admin.role = Role::Admin;
        let err = register_user(&store, admin).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let mut blank = new_user("blank@example.com");
        blank.password = String::new();
        assert!(register_user(&store, blank).is_err());
    }

    #[test]
    fn test_should_login_and_record_last_login() {
        let (_dir, store) = open_store();
        register_user(&store, new_user("jdoe@example.com")).unwrap();

        let user = login(&store, "jdoe@example.com", "secret", Role::Employee)
            .unwrap()
            .unwrap();
        assert!(user.last_login.is_some());
    }

    #[test]
    fn test_should_reject_wrong_credentials() {
        let (_dir, store) = open_store();
        register_user(&store, new_user("jdoe@example.com")).unwrap();

        assert_eq!(
            login(&store, "jdoe@example.com", "wrong", Role::Employee).unwrap(),
            None
        );
        assert_eq!(
            login(&store, "jdoe@example.com", "secret", Role::Hr).unwrap(),
            None
        );
        assert_eq!(
            login(&store, "nobody@example.com", "secret", Role::Employee).unwrap(),
            None
        );

        let user = find_user_by_email(&store, "jdoe@example.com")
            .unwrap()
            .unwrap();
        assert_eq!(user.last_login, None);
    }

    #[test]
    fn test_should_toggle_user_status() {
        let (_dir, store) = open_store();
        let user = register_user(&store, new_user("jdoe@example.com")).unwrap();

        assert_eq!(
            toggle_user_status(&store, user.id).unwrap().as_deref(),
            Some("inactive")
        );
        assert_eq!(
            toggle_user_status(&store, user.id).unwrap().as_deref(),
            Some("active")
        );
        assert_eq!(toggle_user_status(&store, 99).unwrap(), None);
    }

    #[test]
    fn test_should_register_same_email_once_under_contention() {
        const THREADS: usize = 4;

        for _ in 0..20 {
            let (_dir, store) = open_store();
            let barrier = Barrier::new(THREADS);

            let registered = std::thread::scope(|scope| {
                let workers: Vec<_> = (0..THREADS)
                    .map(|_| {
                        scope.spawn(|| {
                            barrier.wait();
                            register_user(&store, new_user("same@example.com"))
                        })
                    })
                    .collect();

                workers
                    .into_iter()
                    .map(|worker| worker.join().unwrap())
                    .filter(|result| match result {
                        Ok(_) => true,
                        Err(err) => {
                            assert_eq!(err.to_string(), "Validation error: Email already exists");
                            false
                        }
                    })
                    .count()
            });

            assert_eq!(registered, 1);
            assert_eq!(store.count(USERS).unwrap(), 1);
        }
    }

    fn user_input(first: &str, last: &str, email: &str) -> UserInput {
        UserInput {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            password: Some("secret".to_string()),
            role: Role::Hr,
            department: None,
        }
    }

    #[test]
    fn test_should_derive_username_from_name() {
        assert_eq!(
            user_input(" Jane ", "O'Doe-Smith", "j@example.com").username(),
            "jane_odoesmith"
        );
        assert_eq!(
            user_input("Zoë", "Li 2", "z@example.com").username(),
            "zo_li2"
        );
    }

    #[test]
    fn test_should_add_user_with_defaults() {
        let (_dir, store) = open_store();

        let user = add_user(&store, user_input("Jane", "Doe", "jane@example.com")).unwrap();
        assert_eq!(user.username, "jane_doe");
        assert_eq!(user.first_name.as_deref(), Some("Jane"));
        assert_eq!(user.department.as_deref(), Some("none"));
        assert_eq!(user.status, "active");
        assert_eq!(user.role, Role::Hr);
        assert_eq!(user.password, "secret");
        assert_eq!(user.permissions, Some(Permissions::default()));
        assert_eq!(user.last_login, None);

        let permissions = user.permissions.unwrap();
        assert!(permissions.tasks.edit);
        assert!(!permissions.tasks.delete);
        assert!(permissions.users.view && !permissions.users.create);
        assert_eq!(permissions.settings, Access::default());
    }

    #[test]
    fn test_should_reject_invalid_added_user() {
        let (_dir, store) = open_store();
        add_user(&store, user_input("Jane", "Doe", "jane@example.com")).unwrap();

        let err = add_user(&store, user_input("Janet", "Doe", "jane@example.com")).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Email already exists");

        let mut input = user_input("Bob", "Smith", "bob@example.com");
        input.password = Some("  ".to_string());
        let err = add_user(&store, input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = add_user(&store, user_input("", "Smith", "bob@example.com")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Field 'firstName' is required and cannot be empty"
        );

        assert_eq!(store.count(USERS).unwrap(), 1);
    }

    #[test]
    fn test_should_edit_user() {
        let (_dir, store) = open_store();
        let user = add_user(&store, user_input("Jane", "Doe", "jane@example.com")).unwrap();

        let mut input = user_input("Jane", "Roe", "jane.roe@example.com");
        input.password = None;
        input.role = Role::Employee;
        input.department = Some("Engineering".to_string());
        let edited = edit_user(&store, user.id, input).unwrap().unwrap();
        assert_eq!(edited.username, "jane_roe");
        assert_eq!(edited.email, "jane.roe@example.com");
        assert_eq!(edited.role, Role::Employee);
        assert_eq!(edited.department.as_deref(), Some("Engineering"));
        assert_eq!(edited.password, "secret");
        assert_eq!(edited.permissions, user.permissions);
        assert_eq!(edited.created_at, user.created_at);

        let mut input = user_input("Jane", "Roe", "jane.roe@example.com");
        input.password = Some("changed".to_string());
        let edited = edit_user(&store, user.id, input).unwrap().unwrap();
        assert_eq!(edited.password, "changed");

        assert_eq!(
            edit_user(&store, 42, user_input("A", "B", "a@example.com")).unwrap(),
            None
        );
    }

    #[test]
    fn test_should_keep_emails_unique_when_editing() {
        let (dir, store) = open_store();
        add_user(&store, user_input("Jane", "Doe", "jane@example.com")).unwrap();
        let bob = add_user(&store, user_input("Bob", "Smith", "bob@example.com")).unwrap();
        let path = dir.path().join("users.json");
        let before = std::fs::read(&path).unwrap();

        let err = edit_user(&store, bob.id, user_input("Bob", "Smith", "jane@example.com"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Email already exists");
        assert_eq!(std::fs::read(&path).unwrap(), before);

        // keeping one's own email is fine
        assert!(
            edit_user(&store, bob.id, user_input("Robert", "Smith", "bob@example.com"))
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn test_should_update_permissions() {
        let (_dir, store) = open_store();
        let user = add_user(&store, user_input("Jane", "Doe", "jane@example.com")).unwrap();

        let mut permissions = Permissions::default();
        permissions.settings = Access {
            view: true,
            create: true,
            edit: true,
            delete: true,
        };
        assert!(update_permissions(&store, user.id, permissions).unwrap());
        assert!(!update_permissions(&store, 99, permissions).unwrap());

        let user = find_user_by_email(&store, "jane@example.com")
            .unwrap()
            .unwrap();
        assert_eq!(user.permissions, Some(permissions));
    }

    #[test]
    fn test_should_build_display_name() {
        let mut user = User::try_from(
            json!({"id": 1, "username": "jdoe", "email": "j@example.com", "role": "hr"})
                .as_object()
                .cloned()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(user.display_name(), "jdoe");

        user.first_name = Some("Jane".to_string());
        user.last_name = Some("Doe ".to_string());
        assert_eq!(user.display_name(), "Jane Doe");
    }
}
