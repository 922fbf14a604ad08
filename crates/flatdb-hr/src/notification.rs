use flatdb_api::prelude::{Conditions, FlatDbResult, RecordId, TableStore};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::catalog::NOTIFICATIONS;
use crate::fields::{fetch, from_records, impl_try_from_record, required, to_record};

/// A notification, as stored in the `notifications` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub priority: Option<String>,
    /// Kind of notification, such as `project` or `meeting`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl_try_from_record!(Notification, NOTIFICATIONS);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub priority: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Stores a new, unread notification.
pub fn create_notification(
    store: &impl TableStore,
    notification: NewNotification,
) -> FlatDbResult<Notification> {
    required("title", &notification.title)?;

    let mut fields = to_record(&notification)?;
    fields.insert("read".to_string(), json!(false));
    let id = store.insert(NOTIFICATIONS, fields)?;
    debug!(%id, "notification created");

    fetch(store, NOTIFICATIONS, &id)
}

/// Marks the notification `id` as read. Returns `false` if it doesn't exist.
pub fn mark_as_read(store: &impl TableStore, id: i64) -> FlatDbResult<bool> {
    store.update(
        NOTIFICATIONS,
        &RecordId::Int(id),
        to_record(&json!({ "read": true }))?,
    )
}

pub fn delete_notification(store: &impl TableStore, id: i64) -> FlatDbResult<bool> {
    store.delete(NOTIFICATIONS, &RecordId::Int(id))
}

pub fn unread_notifications(store: &impl TableStore) -> FlatDbResult<Vec<Notification>> {
    from_records(
        NOTIFICATIONS,
        store.query(NOTIFICATIONS, &Conditions::eq("read", false))?,
    )
}
