use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::{HeaderMap, HeaderName};

use crate::AppState;

pub const AUTH_USER: HeaderName = HeaderName::from_static("auth-user");
pub const AUTH_TOKEN: HeaderName = HeaderName::from_static("auth-token");

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Resolves `Auth-User`/`Auth-Token` and stores the
/// [`Caller`](crate::services::auth_service::Caller) in request extensions.
pub async fn require_header_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let caller = state
        .auth_service
        .authenticate(
            header_str(req.headers(), &AUTH_USER),
            header_str(req.headers(), &AUTH_TOKEN),
        )
        .await;

    match caller {
        Ok(caller) => {
            tracing::debug!(username = %caller.username, team_id = caller.team_id, "authenticated");
            req.extensions_mut().insert(caller);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}
