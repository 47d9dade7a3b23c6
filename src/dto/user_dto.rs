use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use crate::models::user::User;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ListUsersQuery {
    pub team_id: Option<String>,
    pub board_id: Option<String>,
}

/// Body of `POST /users/`. Fields stay loosely typed so that missing and
/// malformed values reach the field validators.
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
#[serde(default)]
pub struct BoardMembershipPayload {
    #[schema(value_type = Option<String>)]
    pub username: Option<JsonValue>,
    #[schema(value_type = Option<i64>)]
    pub board_id: Option<JsonValue>,
    #[schema(value_type = Option<bool>)]
    pub is_active: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DeleteUserQuery {
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberResponse {
    pub username: String,
    pub is_active: bool,
    pub is_admin: bool,
}

impl TeamMemberResponse {
    pub fn from_user(user: &User, is_active: bool) -> Self {
        Self {
            username: user.username.clone(),
            is_active,
            is_admin: user.is_admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}
