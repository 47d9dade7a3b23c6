use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A team member. `password` holds an argon2 PHC string and is never
/// serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub is_admin: bool,
    pub team_id: i64,
    pub created_at: DateTime<Utc>,
}
