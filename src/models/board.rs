use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Board {
    pub id: i64,
    pub name: String,
    pub team_id: i64,
    pub created_at: DateTime<Utc>,
}
