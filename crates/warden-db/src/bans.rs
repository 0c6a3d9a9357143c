use crate::models::BanRow;
use crate::{Store, WriteError, WriteOutcome, nullmap};
use chrono::{DateTime, Utc};
use rusqlite::{Row, params};
use tracing::warn;
use warden_types::{BanSpec, UserId};

impl Store {
    /// Insert one ban row. The start timestamp is assigned here, not by
    /// the caller; the end timestamp derives from the spec (NULL when
    /// permanent, start + duration otherwise).
    pub fn create_ban(
        &self,
        issuer: UserId,
        target: UserId,
        spec: &BanSpec,
        ip: &str,
    ) -> WriteOutcome {
        self.create_ban_at(issuer, target, spec, ip, Utc::now())
    }

    pub(crate) fn create_ban_at(
        &self,
        issuer: UserId,
        target: UserId,
        spec: &BanSpec,
        ip: &str,
        now: DateTime<Utc>,
    ) -> WriteOutcome {
        self.run_write("insert ban", |conn| {
            let mut stmt = conn
                .prepare(
                    "INSERT INTO bans
                        (userid, targetuserid, ipaddress, reason, starttimestamp, endtimestamp)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .map_err(WriteError::Prepare)?;
            stmt.execute(params![
                issuer.0,
                target.0,
                nullmap::bound_ip(spec.bind_ip, ip),
                spec.reason,
                now,
                nullmap::ban_expiry(spec.permanent, now, spec.duration),
            ])
            .map_err(WriteError::Exec)
        })
    }

    /// Visit every currently-active restriction, one call per distinct
    /// (target, ip) pair regardless of historical duplicate rows. Rows
    /// stream off the cursor under the gate; an unreadable row is
    /// skipped, a failed query visits nothing. Reads never retry.
    pub fn for_each_active_ban<F>(&self, visit: F)
    where
        F: FnMut(BanRow),
    {
        self.for_each_active_ban_at(Utc::now(), visit)
    }

    pub(crate) fn for_each_active_ban_at<F>(&self, now: DateTime<Utc>, mut visit: F)
    where
        F: FnMut(BanRow),
    {
        let conn = self.lock_session();
        let mut stmt = match conn.prepare(
            "SELECT targetuserid, ipaddress, endtimestamp
             FROM bans
             WHERE endtimestamp IS NULL OR endtimestamp > ?1
             GROUP BY targetuserid, ipaddress",
        ) {
            Ok(stmt) => stmt,
            Err(e) => {
                warn!(error = %e, "unable to get active bans");
                return;
            }
        };
        let mut rows = match stmt.query(params![now]) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "unable to get active bans");
                return;
            }
        };
        loop {
            match rows.next() {
                Ok(Some(row)) => match scan_ban(row) {
                    Ok(ban) => visit(ban),
                    Err(e) => warn!(error = %e, "unable to scan bans row"),
                },
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "bans cursor failed");
                    break;
                }
            }
        }
    }

    /// Expire every active ban against `target` by setting its end
    /// timestamp to now. Historical rows are kept; a target with
    /// nothing active is a no-op, not an error.
    pub fn lift_ban(&self, target: UserId) -> WriteOutcome {
        self.lift_ban_at(target, Utc::now())
    }

    pub(crate) fn lift_ban_at(&self, target: UserId, now: DateTime<Utc>) -> WriteOutcome {
        self.run_write("lift ban", |conn| {
            let mut stmt = conn
                .prepare(
                    "UPDATE bans
                     SET endtimestamp = ?1
                     WHERE targetuserid = ?2
                       AND (endtimestamp IS NULL OR endtimestamp > ?1)",
                )
                .map_err(WriteError::Prepare)?;
            stmt.execute(params![now, target.0]).map_err(WriteError::Exec)
        })
    }
}

fn scan_ban(row: &Row<'_>) -> rusqlite::Result<BanRow> {
    Ok(BanRow {
        target: UserId(row.get(0)?),
        ip: row.get(1)?,
        ends_at: row.get(2)?,
    })
}
