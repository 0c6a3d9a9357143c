use crate::Store;
use crate::models::UserRow;
use rusqlite::Row;
use tracing::warn;
use warden_types::UserId;

impl Store {
    /// Visit every known user once with the derived protection flag.
    /// Same skip-on-scan-failure and empty-on-query-failure semantics
    /// as the ban lookup; reads never retry.
    pub fn for_each_user<F>(&self, mut visit: F)
    where
        F: FnMut(UserRow),
    {
        let conn = self.lock_session();
        let mut stmt = match conn.prepare(
            "SELECT DISTINCT
                u.userid,
                u.username,
                CASE WHEN f.featureid IS NOT NULL THEN 1 ELSE 0 END AS protected
             FROM users AS u
             LEFT JOIN users_features AS f ON (
                f.userid = u.userid AND
                f.featureid IN (
                    SELECT featureid FROM features
                    WHERE featurename IN ('protected', 'admin')
                )
             )",
        ) {
            Ok(stmt) => stmt,
            Err(e) => {
                warn!(error = %e, "unable to load users");
                return;
            }
        };
        let mut rows = match stmt.query([]) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "unable to load users");
                return;
            }
        };
        loop {
            match rows.next() {
                Ok(Some(row)) => match scan_user(row) {
                    Ok(user) => visit(user),
                    Err(e) => warn!(error = %e, "unable to scan users row"),
                },
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "users cursor failed");
                    break;
                }
            }
        }
    }
}

fn scan_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: UserId(row.get(0)?),
        username: row.get(1)?,
        protected: row.get(2)?,
    })
}
