//! Utilities shared by the store and the record views.

use chrono::Utc;

/// Format of the `created_at` and `updated_at` timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Returns the current UTC time formatted as `YYYY-MM-DD HH:MM:SS`.
pub fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}
