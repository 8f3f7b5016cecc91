//! Storage key/path conventions.
//!
//! Pure string functions with no AWS SDK dependency. These define the canonical
//! layout of session snapshots in a bucket or data directory.

use uuid::Uuid;

pub const SESSIONS_PREFIX: &str = "sessions/";

pub fn session(id: Uuid) -> String {
    format!("{SESSIONS_PREFIX}{id}.json")
}

pub fn session_file_name(id: Uuid) -> String {
    format!("{id}.json")
}

/// Parse a session id back out of a key or file name produced above.
pub fn session_id_from_key(key: &str) -> Option<Uuid> {
    let name = key.strip_prefix(SESSIONS_PREFIX).unwrap_or(key);
    name.strip_suffix(".json")?.parse().ok()
}
