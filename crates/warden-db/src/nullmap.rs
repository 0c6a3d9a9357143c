//! Pure conversions between optional domain values and their
//! storage-null representations. Total functions; no side effects.

use chrono::{DateTime, Utc};
use std::time::Duration;
use warden_types::UserId;

/// A zero-valued target means "no target" and is stored as NULL.
pub fn db_target(id: UserId) -> Option<i64> {
    if id.is_none() { None } else { Some(id.0) }
}

pub fn domain_target(stored: Option<i64>) -> UserId {
    stored.map_or(UserId::NONE, UserId)
}

/// Empty free-text fields are stored as NULL.
pub fn db_text(text: &str) -> Option<&str> {
    if text.is_empty() { None } else { Some(text) }
}

pub fn domain_text(stored: Option<String>) -> String {
    stored.unwrap_or_default()
}

/// An IP is persisted only when the ban binds to one and one was supplied.
pub fn bound_ip(bind_ip: bool, ip: &str) -> Option<&str> {
    if bind_ip { db_text(ip) } else { None }
}

/// Permanent bans have no end timestamp; otherwise it is start + duration.
pub fn ban_expiry(
    permanent: bool,
    start: DateTime<Utc>,
    duration: Duration,
) -> Option<DateTime<Utc>> {
    if permanent {
        return None;
    }
    let millis = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
    let end = start
        .checked_add_signed(chrono::Duration::milliseconds(millis))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    Some(end)
}

/// Millisecond-precision epoch timestamp, truncated to whole seconds.
pub fn event_timestamp(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ms / 1000, 0).unwrap_or(DateTime::UNIX_EPOCH)
}
