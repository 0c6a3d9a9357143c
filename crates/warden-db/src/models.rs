//! Row projections mapping directly to SQLite rows, kept distinct from
//! the warden-types domain models so the DB layer stays independent.

use chrono::{DateTime, Utc};
use warden_types::UserId;

/// One currently-active restriction, as visited by `Store::for_each_active_ban`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanRow {
    pub target: UserId,
    /// Present only when the ban was bound to an IP.
    pub ip: Option<String>,
    /// `None` means the ban is permanent.
    pub ends_at: Option<DateTime<Utc>>,
}

/// One roster entry, as visited by `Store::for_each_user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: UserId,
    pub username: String,
    /// True when the user holds the `protected` or `admin` feature.
    pub protected: bool,
}
