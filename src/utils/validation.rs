//! Field validators for the `/users/` endpoint.
//!
//! Each validator takes the raw input as received, rejects blank and
//! malformed values with a 400, and resolves identifiers against the store
//! with a 404 when nothing matches.

use serde_json::Value as JsonValue;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::{board::Board, team::Team, user::User};
use crate::repositories::{BoardRepository, TeamRepository, UserRepository};

pub fn validate<T: Validate>(val: &T) -> std::result::Result<(), validator::ValidationErrors> {
    val.validate()
}

/// Renders a body field as the text a query string would carry. `null`
/// counts as absent.
pub fn body_field_text(value: Option<&JsonValue>) -> Option<String> {
    match value? {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_id(field: &'static str, label: &str, raw: Option<&str>) -> Result<i64> {
    let raw = non_blank(raw)
        .ok_or_else(|| Error::bad_request(field, format!("{} cannot be empty.", label)))?;
    raw.parse::<i64>()
        .map_err(|_| Error::bad_request(field, format!("{} must be a number.", label)))
}

pub async fn validate_team_id(teams: &dyn TeamRepository, raw: Option<&str>) -> Result<Team> {
    let id = parse_id("team_id", "Team ID", raw)?;
    teams
        .find_team(id)
        .await?
        .ok_or_else(|| Error::not_found("team_id", "Team not found."))
}

pub async fn validate_board_id(boards: &dyn BoardRepository, raw: Option<&str>) -> Result<Board> {
    let id = parse_id("board_id", "Board ID", raw)?;
    boards
        .find_board(id)
        .await?
        .ok_or_else(|| Error::not_found("board_id", "Board not found."))
}

/// Whitespace only decides blankness; lookup uses the value as sent.
pub async fn validate_username(users: &dyn UserRepository, raw: Option<&str>) -> Result<User> {
    let username = raw
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| Error::bad_request("username", "Username cannot be empty."))?;
    users
        .find_by_username(username)
        .await?
        .ok_or_else(|| Error::not_found("username", "User not found."))
}

/// Accepts a JSON boolean or the strings `"true"`/`"false"` in any case.
pub fn validate_is_active(raw: Option<&JsonValue>) -> Result<bool> {
    let invalid = || Error::bad_request("is_active", "Is Active must be either true or false.");
    match raw {
        None | Some(JsonValue::Null) => {
            Err(Error::bad_request("is_active", "Is Active cannot be empty."))
        }
        Some(JsonValue::Bool(b)) => Ok(*b),
        Some(JsonValue::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Err(Error::bad_request("is_active", "Is Active cannot be empty.")),
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(invalid()),
        },
        Some(_) => Err(invalid()),
    }
}
