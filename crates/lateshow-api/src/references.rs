use std::fmt;
use std::sync::Arc;

use lateshow_db::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Guest,
    Episode,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Guest => f.write_str("guest"),
            EntityKind::Episode => f.write_str("episode"),
        }
    }
}

/// Primary-key lookups used as a precondition gate before dependent writes.
#[derive(Clone)]
pub struct ReferenceValidator {
    db: Arc<Database>,
}

impl ReferenceValidator {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn exists(&self, kind: EntityKind, id: i64) -> anyhow::Result<bool> {
        match kind {
            EntityKind::Guest => self.db.guest_exists(id),
            EntityKind::Episode => self.db.episode_exists(id),
        }
    }
}
