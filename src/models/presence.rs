use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One connection's membership in a room: identity plus join time.
/// Owned by exactly one room at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presence {
    pub connection_id: Uuid,
    pub user_name: String,
    pub joined_at: DateTime<Utc>,
}
