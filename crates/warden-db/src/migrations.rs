use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS chatlog (
            userid        INTEGER NOT NULL,
            targetuserid  INTEGER,
            event         TEXT NOT NULL,
            data          TEXT,
            timestamp     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chatlog_user
            ON chatlog(userid, timestamp);

        -- Bans are soft-expired, never deleted; several historical rows
        -- may exist per target.
        CREATE TABLE IF NOT EXISTS bans (
            userid          INTEGER NOT NULL,
            targetuserid    INTEGER NOT NULL,
            ipaddress       TEXT,
            reason          TEXT NOT NULL,
            starttimestamp  TEXT NOT NULL,
            endtimestamp    TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_bans_target
            ON bans(targetuserid, endtimestamp);

        -- Owned by the account system; created if missing so the roster
        -- join always has its targets.
        CREATE TABLE IF NOT EXISTS users (
            userid    INTEGER PRIMARY KEY,
            username  TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS features (
            featureid    INTEGER PRIMARY KEY,
            featurename  TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS users_features (
            userid     INTEGER NOT NULL REFERENCES users(userid),
            featureid  INTEGER NOT NULL REFERENCES features(featureid),
            UNIQUE(userid, featureid)
        );

        -- Seed the designations the protected flag derives from
        INSERT OR IGNORE INTO features (featurename)
            VALUES ('protected'), ('admin');
        ",
    )?;

    info!("Database schema checked");
    Ok(())
}
