use serde::Deserialize;

/// Query parameters shared by read endpoints over soft-deletable records.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ActiveFilter {
    /// Also return rows that have been soft-deleted.
    #[serde(default)]
    pub include_inactive: bool,
}

/// Generate a new random ID (UUIDv4, no dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
