use crate::{Store, WriteError, WriteOutcome, nullmap};
use rusqlite::params;
use warden_types::ChatEvent;

impl Store {
    /// Append one chat-event row. Fire-and-forget: failures are logged
    /// and retried once, never surfaced as an error.
    pub fn record_event(&self, event: &ChatEvent) -> WriteOutcome {
        self.run_write("insert chat event", |conn| {
            let mut stmt = conn
                .prepare(
                    "INSERT INTO chatlog (userid, targetuserid, event, data, timestamp)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(WriteError::Prepare)?;
            stmt.execute(params![
                event.actor.0,
                nullmap::db_target(event.target),
                event.kind,
                nullmap::db_text(&event.data),
                nullmap::event_timestamp(event.timestamp_ms),
            ])
            .map_err(WriteError::Exec)
        })
    }
}
