use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Map, Value as JsonValue};

pub type Result<T> = std::result::Result<T, Error>;

pub const AUTH_FAILED: &str = "Authentication failed.";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {field}: {message}")]
    BadRequest { field: &'static str, message: String },

    #[error("Not found: {field}: {message}")]
    NotFound { field: &'static str, message: String },

    #[error("Forbidden: {field}: {message}")]
    Forbidden { field: &'static str, message: String },

    #[error("Authentication failed")]
    NotAuthenticated,

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn bad_request(field: &'static str, message: impl Into<String>) -> Self {
        Error::BadRequest {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(field: &'static str, message: impl Into<String>) -> Self {
        Error::NotFound {
            field,
            message: message.into(),
        }
    }

    pub fn forbidden(field: &'static str, message: impl Into<String>) -> Self {
        Error::Forbidden {
            field,
            message: message.into(),
        }
    }
}

fn field_body(field: &str, message: String) -> JsonValue {
    json!({ field: message })
}

/// Collapses validator output into `{field: first message}`.
fn validation_body(errors: &validator::ValidationErrors) -> JsonValue {
    let mut body = Map::new();
    for (field, errs) in errors.field_errors() {
        let message = errs
            .first()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}.", field))
            })
            .unwrap_or_else(|| format!("Invalid {}.", field));
        body.insert(field.to_string(), JsonValue::String(message));
    }
    JsonValue::Object(body)
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            Error::BadRequest { field, message } => {
                (StatusCode::BAD_REQUEST, field_body(field, message))
            }
            Error::NotFound { field, message } => {
                (StatusCode::NOT_FOUND, field_body(field, message))
            }
            Error::Forbidden { field, message } => {
                (StatusCode::FORBIDDEN, field_body(field, message))
            }
            Error::NotAuthenticated => (
                StatusCode::FORBIDDEN,
                field_body("auth", AUTH_FAILED.to_string()),
            ),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, validation_body(&err)),
            Error::Json(err) => (StatusCode::BAD_REQUEST, field_body("body", err.to_string())),
            Error::Database(err) => {
                tracing::error!(error = ?err, "database failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Database error" }),
                )
            }
            Error::Internal(msg) => {
                tracing::error!(%msg, "internal failure");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
            other => {
                tracing::error!(error = %other, "unhandled failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An unexpected error occurred" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::not_found("detail", "Resource not found."),
            other => Error::Database(other),
        }
    }
}
