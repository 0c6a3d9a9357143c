use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Numeric user identifier. Zero is the "no user" sentinel used for
/// events without a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl UserId {
    /// The sentinel id meaning "no user".
    pub const NONE: UserId = UserId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A logged chat action, immutable once recorded.
///
/// `target == UserId::NONE` means the event has no target user and
/// `data == ""` means it carries no payload; both are stored as NULL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEvent {
    pub actor: UserId,
    pub kind: String,
    pub target: UserId,
    pub data: String,
    /// Milliseconds since epoch; truncated to whole seconds on storage.
    pub timestamp_ms: i64,
}

/// Caller-supplied parameters for a new ban.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BanSpec {
    pub reason: String,
    /// Permanent bans never expire; `duration` is ignored.
    pub permanent: bool,
    pub duration: Duration,
    /// Bind the ban to the offender's IP address, if one is supplied.
    pub bind_ip: bool,
}
