use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id              INTEGER PRIMARY KEY,
                username        TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE guests (
                id          INTEGER PRIMARY KEY,
                name        TEXT NOT NULL,
                occupation  TEXT NOT NULL
            );

            CREATE TABLE episodes (
                id      INTEGER PRIMARY KEY,
                date    TEXT NOT NULL,
                number  INTEGER NOT NULL
            );

            CREATE TABLE appearances (
                id          INTEGER PRIMARY KEY,
                rating      INTEGER NOT NULL,
                guest_id    INTEGER NOT NULL REFERENCES guests(id),
                episode_id  INTEGER NOT NULL REFERENCES episodes(id)
            );

            CREATE INDEX idx_appearances_guest ON appearances(guest_id);
            CREATE INDEX idx_appearances_episode ON appearances(episode_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
