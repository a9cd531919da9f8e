use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Millisecond-resolution timestamp layout used as the session directory name.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S%.3f";

/// Build a session identifier such as `2024-05-01_14-03-07.512-9f3c2a1b`.
///
/// The random suffix keeps sessions that start in the same millisecond apart.
pub fn new_session_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", now.format(TIMESTAMP_FORMAT), &suffix[..8])
}
