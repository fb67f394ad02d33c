use serde::{Deserialize, Serialize};

/// Primary key of a registered user.
pub type UserId = i64;

/// A guest's rated appearance on one episode.
/// Serialized as-is in the `POST /appearances` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    pub id: i64,
    pub rating: i64,
    pub guest_id: i64,
    pub episode_id: i64,
}
