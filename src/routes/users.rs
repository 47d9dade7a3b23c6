use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::{IntoResponse, Json, Response},
    Extension,
};

use crate::{
    dto::user_dto::{BoardMembershipPayload, DeleteUserQuery, ListUsersQuery},
    error::{Error, Result},
    services::{
        auth_service::Caller,
        membership_service::{UsersCommand, UsersOutcome},
    },
    AppState,
};

impl IntoResponse for UsersOutcome {
    fn into_response(self) -> Response {
        match self {
            UsersOutcome::Members(members) => Json(members).into_response(),
            UsersOutcome::Message(msg) => Json(msg).into_response(),
        }
    }
}

fn query_error(rejection: QueryRejection) -> Error {
    Error::bad_request("query", rejection.body_text())
}

#[utoipa::path(
    get,
    path = "/users/",
    params(
        ("team_id" = String, Query, description = "Team of the caller"),
        ("board_id" = String, Query, description = "Board whose membership is reported"),
        ("Auth-User" = String, Header, description = "Username of the caller"),
        ("Auth-Token" = String, Header, description = "Token issued at login")
    ),
    responses(
        (status = 200, description = "Team members with board membership", body = [TeamMemberResponse]),
        (status = 400, description = "Blank or malformed identifier"),
        (status = 403, description = "Authentication failed"),
        (status = 404, description = "Team or board not found")
    )
)]
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    query: std::result::Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<UsersOutcome> {
    let Query(query) = query.map_err(query_error)?;
    state
        .membership_service
        .execute(
            &caller,
            UsersCommand::List {
                team_id: query.team_id,
                board_id: query.board_id,
            },
        )
        .await
}

#[utoipa::path(
    post,
    path = "/users/",
    params(
        ("Auth-User" = String, Header, description = "Username of the caller"),
        ("Auth-Token" = String, Header, description = "Token issued at login")
    ),
    request_body = BoardMembershipPayload,
    responses(
        (status = 200, description = "Membership updated", body = MessageResponse),
        (status = 400, description = "Blank or malformed field"),
        (status = 403, description = "Authentication failed"),
        (status = 404, description = "User or board not found")
    )
)]
#[axum::debug_handler]
pub async fn update_board_membership(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: std::result::Result<Json<BoardMembershipPayload>, JsonRejection>,
) -> Result<UsersOutcome> {
    let Json(payload) = payload.map_err(|rejection| Error::bad_request("body", rejection.body_text()))?;
    state
        .membership_service
        .execute(
            &caller,
            UsersCommand::SetBoardMembership {
                username: payload.username,
                board_id: payload.board_id,
                is_active: payload.is_active,
            },
        )
        .await
}

#[utoipa::path(
    delete,
    path = "/users/",
    params(
        ("username" = String, Query, description = "Member to delete"),
        ("Auth-User" = String, Header, description = "Username of an admin caller"),
        ("Auth-Token" = String, Header, description = "Token issued at login")
    ),
    responses(
        (status = 200, description = "Member deleted", body = MessageResponse),
        (status = 400, description = "Blank username"),
        (status = 403, description = "Not authenticated, not an admin, or target is an admin"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_member(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    query: std::result::Result<Query<DeleteUserQuery>, QueryRejection>,
) -> Result<UsersOutcome> {
    let Query(query) = query.map_err(query_error)?;
    state
        .membership_service
        .execute(
            &caller,
            UsersCommand::DeleteMember {
                username: query.username,
            },
        )
        .await
}
