use crate::models::{AppearanceRow, UserRow};
use crate::Database;
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

impl Database {
    // -- Users --

    /// Insert a user. Returns `None` when the username is already taken;
    /// the UNIQUE constraint makes the check and the write one statement.
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (username, password_hash) VALUES (?1, ?2)
                 ON CONFLICT(username) DO NOTHING",
                (username, password_hash),
            )?;
            if inserted == 0 {
                return Ok(None);
            }
            Ok(Some(conn.last_insert_rowid()))
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    // -- Guests & episodes --

    /// Returns the new guest's id.
    pub fn create_guest(&self, name: &str, occupation: &str) -> Result<i64> {
        self.with_conn(|conn| insert_guest(conn, name, occupation))
    }

    /// Returns the new episode's id.
    pub fn create_episode(&self, date: NaiveDate, number: i64) -> Result<i64> {
        self.with_conn(|conn| insert_episode(conn, date, number))
    }

    pub fn guest_exists(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| row_exists(conn, "SELECT 1 FROM guests WHERE id = ?1", id))
    }

    pub fn episode_exists(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| row_exists(conn, "SELECT 1 FROM episodes WHERE id = ?1", id))
    }

    // -- Appearances --

    /// Insert an appearance inside its own transaction and read the stored row
    /// back. Any error drops the transaction, which rolls it back.
    pub fn insert_appearance(
        &self,
        rating: i64,
        guest_id: i64,
        episode_id: i64,
    ) -> Result<AppearanceRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO appearances (rating, guest_id, episode_id) VALUES (?1, ?2, ?3)",
                rusqlite::params![rating, guest_id, episode_id],
            )?;
            let id = tx.last_insert_rowid();
            let row = query_appearance(&tx, id)?
                .ok_or_else(|| anyhow::anyhow!("Appearance {} vanished after insert", id))?;
            tx.commit()?;
            Ok(row)
        })
    }

    pub fn get_appearance(&self, id: i64) -> Result<Option<AppearanceRow>> {
        self.with_conn(|conn| query_appearance(conn, id))
    }

    pub fn count_appearances(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM appearances", [], |row| row.get(0))?)
        })
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, password_hash FROM users WHERE username = ?1",
    )?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                password_hash: row.get(1)?,
            })
        })
        .optional()?;

    Ok(row)
}

pub(crate) fn insert_guest(conn: &Connection, name: &str, occupation: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO guests (name, occupation) VALUES (?1, ?2)",
        (name, occupation),
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn insert_episode(conn: &Connection, date: NaiveDate, number: i64) -> Result<i64> {
    // Stored as ISO-8601 "YYYY-MM-DD" text.
    conn.execute(
        "INSERT INTO episodes (date, number) VALUES (?1, ?2)",
        rusqlite::params![date.format("%Y-%m-%d").to_string(), number],
    )?;
    Ok(conn.last_insert_rowid())
}

fn row_exists(conn: &Connection, sql: &str, id: i64) -> Result<bool> {
    let found: Option<i64> = conn.query_row(sql, [id], |row| row.get(0)).optional()?;
    Ok(found.is_some())
}

fn query_appearance(conn: &Connection, id: i64) -> Result<Option<AppearanceRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, rating, guest_id, episode_id FROM appearances WHERE id = ?1",
    )?;

    let row = stmt
        .query_row([id], |row| {
            Ok(AppearanceRow {
                id: row.get(0)?,
                rating: row.get(1)?,
                guest_id: row.get(2)?,
                episode_id: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
