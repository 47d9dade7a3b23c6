use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Json},
};

use crate::{
    dto::auth_dto::LoginPayload,
    error::{Error, Result},
    AppState,
};

#[utoipa::path(
    post,
    path = "/login/",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 400, description = "Invalid payload or incorrect password"),
        (status = 404, description = "Unknown username")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload.map_err(|rejection| Error::bad_request("body", rejection.body_text()))?;
    let response = state.auth_service.login(payload).await?;
    Ok(Json(response))
}
