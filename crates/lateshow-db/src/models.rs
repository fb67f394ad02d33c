//! Database row types: these map directly to SQLite rows.
//! Distinct from lateshow-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: i64,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppearanceRow {
    pub id: i64,
    pub rating: i64,
    pub guest_id: i64,
    pub episode_id: i64,
}
