use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Blank input gets its own message ahead of the length range.
fn check_text(value: &str, label: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    let message = if value.trim().is_empty() {
        format!("{} cannot be empty.", label)
    } else if len < min || len > max {
        format!(
            "{} must be between {} and {} characters long.",
            label, min, max
        )
    } else {
        return Ok(());
    };
    let mut err = ValidationError::new("length");
    err.message = Some(Cow::Owned(message));
    Err(err)
}

fn check_username(value: &str) -> Result<(), ValidationError> {
    check_text(value, "Username", 5, 35)
}

fn check_password(value: &str) -> Result<(), ValidationError> {
    check_text(value, "Password", 8, 255)
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate, ToSchema)]
#[serde(default)]
pub struct LoginPayload {
    #[validate(custom(function = "check_username"))]
    pub username: String,
    #[validate(custom(function = "check_password"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub msg: String,
    pub username: String,
    pub token: String,
    pub team_id: i64,
    pub is_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_for(payload: &LoginPayload, field: &str) -> Option<String> {
        let errors = payload.validate().err()?;
        let message = errors
            .field_errors()
            .iter()
            .find(|(name, _)| name.to_string() == field)
            .and_then(|(_, errs)| errs.first())
            .and_then(|e| e.message.as_ref())
            .map(|m| m.to_string());
        message
    }

    #[test]
    fn blank_fields_report_empty() {
        let payload = LoginPayload {
            username: "   ".into(),
            password: String::new(),
        };
        assert_eq!(
            message_for(&payload, "username").as_deref(),
            Some("Username cannot be empty.")
        );
        assert_eq!(
            message_for(&payload, "password").as_deref(),
            Some("Password cannot be empty.")
        );
    }

    #[test]
    fn out_of_range_fields_report_length() {
        let payload = LoginPayload {
            username: "abc".into(),
            password: "x".repeat(256),
        };
        assert_eq!(
            message_for(&payload, "username").as_deref(),
            Some("Username must be between 5 and 35 characters long.")
        );
        assert_eq!(
            message_for(&payload, "password").as_deref(),
            Some("Password must be between 8 and 255 characters long.")
        );
    }

    #[test]
    fn valid_credentials_pass() {
        let payload = LoginPayload {
            username: "member1".into(),
            password: "memberpass".into(),
        };
        assert!(payload.validate().is_ok());
    }
}
