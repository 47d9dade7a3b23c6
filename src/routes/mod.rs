pub mod health;
pub mod login;
pub mod users;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::{
    dto::{
        auth_dto::{LoginPayload, LoginResponse},
        user_dto::{BoardMembershipPayload, MessageResponse, TeamMemberResponse},
    },
    middleware::{auth::require_header_auth, cors::api_cors},
    AppState,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        login::login,
        users::list_users,
        users::update_board_membership,
        users::delete_member,
    ),
    components(schemas(
        LoginPayload,
        LoginResponse,
        BoardMembershipPayload,
        TeamMemberResponse,
        MessageResponse,
    ))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Full application router. `/users/` sits behind header authentication.
pub fn router(state: AppState) -> Router {
    let users_api = Router::new()
        .route(
            "/users/",
            get(users::list_users)
                .post(users::update_board_membership)
                .delete(users::delete_member),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_header_auth,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/login/", post(login::login))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(users_api)
        .with_state(state)
        .layer(api_cors())
        .layer(TraceLayer::new_for_http())
}
