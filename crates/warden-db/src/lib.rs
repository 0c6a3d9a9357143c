pub mod config;
mod migrations;
pub mod models;
pub mod nullmap;

mod bans;
mod events;
mod roster;

pub use config::{ConfigError, StoreConfig};
pub use models::{BanRow, UserRow};

use anyhow::Result;
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fixed delay between connection attempts.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Storage engine selector, parsed from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Sqlite,
}

/// What became of a fire-and-forget write.
///
/// Writes never return an error: failures are logged and retried once,
/// and callers that care can inspect the outcome instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The row was written, on the first or second attempt.
    Persisted,
    /// Both attempts failed; the write was dropped.
    Dropped,
}

impl WriteOutcome {
    pub fn is_persisted(self) -> bool {
        matches!(self, WriteOutcome::Persisted)
    }
}

/// Failure of a single write attempt. Prepare failures log at warn,
/// execution failures at debug.
#[derive(Debug, Error)]
pub(crate) enum WriteError {
    #[error("unable to prepare statement: {0}")]
    Prepare(rusqlite::Error),
    #[error("unable to execute statement: {0}")]
    Exec(rusqlite::Error),
}

/// Single choke point between application logic and durable storage.
///
/// Owns the one live connection. Every operation acquires the session
/// slot exclusively, so at most one statement is prepared or executed
/// at a time process-wide; neither the handle nor statement creation is
/// assumed safe for concurrent use.
pub struct Store {
    session: Mutex<Connection>,
}

impl Store {
    /// Open and verify a connection, retrying forever with a fixed
    /// one-second delay. Does not return until the handle is live.
    pub fn connect(driver: Driver, dsn: &str) -> Store {
        Store {
            session: Mutex::new(Self::connect_loop(driver, dsn)),
        }
    }

    /// Replace the live handle with a freshly opened one. Blocks like
    /// [`Store::connect`]; the swap happens under the gate, so no
    /// in-flight operation observes a half-initialized session.
    pub fn reconnect(&self, driver: Driver, dsn: &str) {
        let conn = Self::connect_loop(driver, dsn);
        *self.lock_session() = conn;
    }

    fn connect_loop(driver: Driver, dsn: &str) -> Connection {
        loop {
            match open_and_verify(driver, dsn) {
                Ok(conn) => {
                    info!(dsn, "database connected");
                    return conn;
                }
                Err(e) => {
                    warn!(dsn, error = %e, "could not connect to database");
                    std::thread::sleep(RETRY_DELAY);
                }
            }
        }
    }

    /// Acquire the gate. A poisoned lock still guards a usable
    /// connection, so the guard is recovered rather than propagated.
    pub(crate) fn lock_session(&self) -> MutexGuard<'_, Connection> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a write of at most two attempts. Each attempt acquires the
    /// gate fresh and releases it, statement included, before any
    /// retry. Failures are logged, never returned.
    pub(crate) fn run_write<F>(&self, what: &str, mut attempt: F) -> WriteOutcome
    where
        F: FnMut(&Connection) -> Result<usize, WriteError>,
    {
        for _ in 0..2 {
            let result = {
                let conn = self.lock_session();
                attempt(&conn)
            };
            match result {
                Ok(_) => return WriteOutcome::Persisted,
                Err(WriteError::Prepare(e)) => {
                    warn!(op = what, error = %e, "unable to prepare statement");
                }
                Err(WriteError::Exec(e)) => {
                    debug!(op = what, error = %e, "unable to execute statement");
                }
            }
        }
        WriteOutcome::Dropped
    }
}

/// One open-and-verify attempt: open the handle, ping it, apply the
/// session pragmas and bootstrap the schema.
fn open_and_verify(driver: Driver, dsn: &str) -> Result<Connection> {
    let conn = match driver {
        Driver::Sqlite => {
            if dsn == ":memory:" {
                Connection::open_in_memory()?
            } else {
                Connection::open(dsn)?
            }
        }
    };

    // Ping before handing the session out.
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;

    // WAL mode for concurrent reads
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    migrations::run(&conn)?;

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use warden_types::{BanSpec, UserId};

    fn mem_store() -> Store {
        Store::connect(Driver::Sqlite, ":memory:")
    }

    fn count(store: &Store, sql: &str) -> i64 {
        store
            .lock_session()
            .query_row(sql, [], |row| row.get(0))
            .unwrap()
    }

    fn spam_ban() -> BanSpec {
        BanSpec {
            reason: "spam".into(),
            permanent: true,
            duration: Duration::ZERO,
            bind_ip: false,
        }
    }

    #[test]
    fn connect_provides_live_handle() {
        let store = mem_store();
        let one: i64 = store
            .lock_session()
            .query_row("SELECT 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(one, 1);
        // Schema bootstrapped as part of open-and-verify.
        assert_eq!(count(&store, "SELECT COUNT(*) FROM chatlog"), 0);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM bans"), 0);
    }

    #[test]
    fn open_and_verify_rejects_bad_dsn() {
        // A directory is not a usable database file.
        assert!(open_and_verify(Driver::Sqlite, "/").is_err());
    }

    #[test]
    fn write_retries_exactly_once_then_persists() {
        let store = mem_store();
        let mut attempts = 0;
        let outcome = store.run_write("test write", |conn| {
            attempts += 1;
            if attempts == 1 {
                return Err(WriteError::Prepare(rusqlite::Error::QueryReturnedNoRows));
            }
            conn.execute(
                "INSERT INTO chatlog (userid, event, timestamp) VALUES (1, 'mute', ?1)",
                [Utc::now()],
            )
            .map_err(WriteError::Exec)
        });
        assert_eq!(outcome, WriteOutcome::Persisted);
        assert_eq!(attempts, 2);
        // Not zero, not two.
        assert_eq!(count(&store, "SELECT COUNT(*) FROM chatlog"), 1);
    }

    #[test]
    fn write_gives_up_after_second_failure() {
        let store = mem_store();
        let mut attempts = 0;
        let outcome = store.run_write("test write", |_conn| {
            attempts += 1;
            Err(WriteError::Exec(rusqlite::Error::QueryReturnedNoRows))
        });
        assert_eq!(outcome, WriteOutcome::Dropped);
        assert_eq!(attempts, 2);
    }

    #[test]
    fn reconnect_replaces_handle_wholesale() {
        let store = mem_store();
        store.create_ban(UserId(1), UserId(2), &spam_ban(), "");
        assert_eq!(count(&store, "SELECT COUNT(*) FROM bans"), 1);

        // A fresh in-memory session starts over from an empty store.
        store.reconnect(Driver::Sqlite, ":memory:");
        assert_eq!(count(&store, "SELECT COUNT(*) FROM bans"), 0);
    }

    #[test]
    fn reconnect_keeps_durable_rows() {
        let dir = tempfile::tempdir().unwrap();
        let dsn = dir.path().join("warden.db");
        let dsn = dsn.to_str().unwrap();

        let store = Store::connect(Driver::Sqlite, dsn);
        store.create_ban(UserId(1), UserId(2), &spam_ban(), "");
        assert_eq!(count(&store, "SELECT COUNT(*) FROM bans"), 1);

        store.reconnect(Driver::Sqlite, dsn);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM bans"), 1);
    }
}
