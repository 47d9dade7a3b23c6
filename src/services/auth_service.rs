use std::sync::Arc;

use crate::dto::auth_dto::{LoginPayload, LoginResponse};
use crate::error::{Error, Result};
use crate::repositories::UserRepository;
use crate::utils::{
    crypto::verify_password,
    token::{issue_auth_token, verify_auth_token},
    validation::validate,
};

/// The authenticated user behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub username: String,
    pub team_id: i64,
    pub is_admin: bool,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    token_secret: Arc<str>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, token_secret: &str) -> Self {
        Self {
            users,
            token_secret: Arc::from(token_secret),
        }
    }

    pub fn issue_token(&self, username: &str) -> String {
        issue_auth_token(&self.token_secret, username)
    }

    /// Resolves an `Auth-User`/`Auth-Token` pair to the caller's team. Every
    /// failure collapses into [`Error::NotAuthenticated`].
    pub async fn authenticate(&self, username: Option<&str>, token: Option<&str>) -> Result<Caller> {
        let (Some(username), Some(token)) = (
            username.filter(|u| !u.is_empty()),
            token.filter(|t| !t.is_empty()),
        ) else {
            return Err(Error::NotAuthenticated);
        };

        if !verify_auth_token(&self.token_secret, username, token) {
            tracing::debug!(%username, "auth token mismatch");
            return Err(Error::NotAuthenticated);
        }

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(Error::NotAuthenticated)?;

        Ok(Caller {
            username: user.username,
            team_id: user.team_id,
            is_admin: user.is_admin,
        })
    }

    pub fn authorize(&self, caller: &Caller) -> Result<()> {
        if caller.is_admin {
            Ok(())
        } else {
            Err(Error::forbidden("auth", "Only team admins can delete members."))
        }
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<LoginResponse> {
        validate(&payload)?;

        let user = self
            .users
            .find_by_username(&payload.username)
            .await?
            .ok_or_else(|| Error::not_found("username", "Invalid username."))?;

        let stored = user.password.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&payload.password, &stored))
            .await
            .map_err(|e| Error::Internal(format!("password check aborted: {}", e)))?;
        if !matches {
            return Err(Error::bad_request("password", "Incorrect password."));
        }

        tracing::info!(username = %user.username, team_id = user.team_id, "user logged in");
        Ok(LoginResponse {
            msg: "Login successful.".to_string(),
            token: self.issue_token(&user.username),
            username: user.username,
            team_id: user.team_id,
            is_admin: user.is_admin,
        })
    }
}
