use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::dto::user_dto::{MessageResponse, TeamMemberResponse};
use crate::error::{Error, Result};
use crate::models::board::Board;
use crate::repositories::{BoardRepository, TeamRepository, UserRepository};
use crate::services::auth_service::{AuthService, Caller};
use crate::utils::validation::{
    body_field_text, validate_board_id, validate_is_active, validate_team_id, validate_username,
};

/// One variant per verb on `/users/`. Inputs are carried raw; validation
/// happens inside the matching handler, in a fixed order.
#[derive(Debug, Clone)]
pub enum UsersCommand {
    List {
        team_id: Option<String>,
        board_id: Option<String>,
    },
    SetBoardMembership {
        username: Option<JsonValue>,
        board_id: Option<JsonValue>,
        is_active: Option<JsonValue>,
    },
    DeleteMember {
        username: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsersOutcome {
    Members(Vec<TeamMemberResponse>),
    Message(MessageResponse),
}

#[derive(Clone)]
pub struct MembershipService {
    teams: Arc<dyn TeamRepository>,
    boards: Arc<dyn BoardRepository>,
    users: Arc<dyn UserRepository>,
    auth: AuthService,
}

impl MembershipService {
    pub fn new(
        teams: Arc<dyn TeamRepository>,
        boards: Arc<dyn BoardRepository>,
        users: Arc<dyn UserRepository>,
        auth: AuthService,
    ) -> Self {
        Self {
            teams,
            boards,
            users,
            auth,
        }
    }

    pub async fn execute(&self, caller: &Caller, command: UsersCommand) -> Result<UsersOutcome> {
        match command {
            UsersCommand::List { team_id, board_id } => self
                .list_members(caller, team_id.as_deref(), board_id.as_deref())
                .await
                .map(UsersOutcome::Members),
            UsersCommand::SetBoardMembership {
                username,
                board_id,
                is_active,
            } => {
                let username = body_field_text(username.as_ref());
                let board_id = body_field_text(board_id.as_ref());
                self.set_board_membership(
                    caller,
                    username.as_deref(),
                    board_id.as_deref(),
                    is_active.as_ref(),
                )
                .await
                .map(UsersOutcome::Message)
            }
            UsersCommand::DeleteMember { username } => self
                .delete_member(caller, username.as_deref())
                .await
                .map(UsersOutcome::Message),
        }
    }

    async fn board_for_caller(&self, caller: &Caller, raw: Option<&str>) -> Result<Board> {
        let board = validate_board_id(self.boards.as_ref(), raw).await?;
        if board.team_id != caller.team_id {
            return Err(Error::NotAuthenticated);
        }
        Ok(board)
    }

    pub async fn list_members(
        &self,
        caller: &Caller,
        team_id: Option<&str>,
        board_id: Option<&str>,
    ) -> Result<Vec<TeamMemberResponse>> {
        let team = validate_team_id(self.teams.as_ref(), team_id).await?;
        if team.id != caller.team_id {
            return Err(Error::NotAuthenticated);
        }
        let board = self.board_for_caller(caller, board_id).await?;

        let active: HashSet<i64> = self
            .boards
            .active_user_ids(board.id)
            .await?
            .into_iter()
            .collect();
        let members = self.users.list_by_team(team.id).await?;

        Ok(members
            .iter()
            .map(|user| TeamMemberResponse::from_user(user, active.contains(&user.id)))
            .collect())
    }

    pub async fn set_board_membership(
        &self,
        caller: &Caller,
        username: Option<&str>,
        board_id: Option<&str>,
        is_active: Option<&JsonValue>,
    ) -> Result<MessageResponse> {
        let user = validate_username(self.users.as_ref(), username).await?;
        if user.team_id != caller.team_id {
            return Err(Error::NotAuthenticated);
        }
        let board = self.board_for_caller(caller, board_id).await?;
        let is_active = validate_is_active(is_active)?;

        let msg = if is_active {
            self.boards.add_member(board.id, user.id).await?;
            format!("{} is added to {}.", user.username, board.name)
        } else {
            self.boards.remove_member(board.id, user.id).await?;
            format!("{} is removed from {}.", user.username, board.name)
        };

        tracing::info!(
            actor = %caller.username,
            username = %user.username,
            board_id = board.id,
            is_active,
            "board membership updated"
        );
        Ok(MessageResponse::new(msg))
    }

    pub async fn delete_member(
        &self,
        caller: &Caller,
        username: Option<&str>,
    ) -> Result<MessageResponse> {
        self.auth.authorize(caller)?;

        let user = validate_username(self.users.as_ref(), username).await?;
        if user.team_id != caller.team_id {
            return Err(Error::NotAuthenticated);
        }
        if user.is_admin {
            return Err(Error::forbidden(
                "username",
                "Team leaders cannot be deleted from their teams.",
            ));
        }

        if !self.users.delete_user(user.id).await? {
            // lost a race with another delete
            return Err(Error::not_found("username", "User not found."));
        }

        tracing::info!(actor = %caller.username, username = %user.username, "member deleted");
        Ok(MessageResponse::new("Member has been deleted successfully."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{board::Board, team::Team, user::User};
    use crate::repositories::{MockBoardRepository, MockTeamRepository, MockUserRepository};
    use chrono::Utc;
    use serde_json::json;

    fn caller(team_id: i64, is_admin: bool) -> Caller {
        Caller {
            username: "lead".into(),
            team_id,
            is_admin,
        }
    }

    fn user(id: i64, username: &str, team_id: i64, is_admin: bool) -> User {
        User {
            id,
            username: username.into(),
            password: String::new(),
            is_admin,
            team_id,
            created_at: Utc::now(),
        }
    }

    fn board(id: i64, team_id: i64) -> Board {
        Board {
            id,
            name: "Roadmap".into(),
            team_id,
            created_at: Utc::now(),
        }
    }

    fn service(
        teams: MockTeamRepository,
        boards: MockBoardRepository,
        users: MockUserRepository,
    ) -> MembershipService {
        let users: Arc<dyn UserRepository> = Arc::new(users);
        let auth = AuthService::new(users.clone(), "secret");
        MembershipService::new(Arc::new(teams), Arc::new(boards), users, auth)
    }

    #[tokio::test]
    async fn list_with_foreign_team_is_not_authenticated() {
        let mut teams = MockTeamRepository::new();
        teams.expect_find_team().returning(|id| {
            Ok(Some(Team {
                id,
                created_at: Utc::now(),
            }))
        });
        let mut boards = MockBoardRepository::new();
        boards.expect_find_board().times(0);
        let mut users = MockUserRepository::new();
        users.expect_list_by_team().times(0);

        let svc = service(teams, boards, users);
        let err = svc
            .execute(
                &caller(1, true),
                UsersCommand::List {
                    team_id: Some("2".into()),
                    board_id: Some("3".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated));
    }

    #[tokio::test]
    async fn list_annotates_board_membership() {
        let mut teams = MockTeamRepository::new();
        teams.expect_find_team().returning(|id| {
            Ok(Some(Team {
                id,
                created_at: Utc::now(),
            }))
        });
        let mut boards = MockBoardRepository::new();
        boards
            .expect_find_board()
            .returning(|id| Ok(Some(board(id, 1))));
        boards
            .expect_active_user_ids()
            .returning(|_| Ok(vec![11]));
        let mut users = MockUserRepository::new();
        users.expect_list_by_team().returning(|team_id| {
            Ok(vec![
                user(10, "lead", team_id, true),
                user(11, "dev", team_id, false),
            ])
        });

        let svc = service(teams, boards, users);
        let outcome = svc
            .execute(
                &caller(1, true),
                UsersCommand::List {
                    team_id: Some("1".into()),
                    board_id: Some("5".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(
            outcome,
            UsersOutcome::Members(vec![
                TeamMemberResponse {
                    username: "lead".into(),
                    is_active: false,
                    is_admin: true
                },
                TeamMemberResponse {
                    username: "dev".into(),
                    is_active: true,
                    is_admin: false
                },
            ])
        );
    }

    #[tokio::test]
    async fn set_membership_adds_or_removes() {
        let mut boards = MockBoardRepository::new();
        boards
            .expect_find_board()
            .returning(|id| Ok(Some(board(id, 1))));
        boards.expect_add_member().times(1).returning(|_, _| Ok(()));
        boards.expect_remove_member().times(1).returning(|_, _| Ok(()));
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Ok(Some(user(11, "dev", 1, false))));

        let svc = service(MockTeamRepository::new(), boards, users);
        let added = svc
            .execute(
                &caller(1, false),
                UsersCommand::SetBoardMembership {
                    username: Some(json!("dev")),
                    board_id: Some(json!(5)),
                    is_active: Some(json!(true)),
                },
            )
            .await
            .unwrap();
        assert_eq!(
            added,
            UsersOutcome::Message(MessageResponse::new("dev is added to Roadmap."))
        );

        let removed = svc
            .execute(
                &caller(1, false),
                UsersCommand::SetBoardMembership {
                    username: Some(json!("dev")),
                    board_id: Some(json!("5")),
                    is_active: Some(json!("false")),
                },
            )
            .await
            .unwrap();
        assert_eq!(
            removed,
            UsersOutcome::Message(MessageResponse::new("dev is removed from Roadmap."))
        );
    }

    #[tokio::test]
    async fn set_membership_validates_is_active_before_mutating() {
        let mut boards = MockBoardRepository::new();
        boards
            .expect_find_board()
            .returning(|id| Ok(Some(board(id, 1))));
        boards.expect_add_member().times(0);
        boards.expect_remove_member().times(0);
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Ok(Some(user(11, "dev", 1, false))));

        let svc = service(MockTeamRepository::new(), boards, users);
        let err = svc
            .execute(
                &caller(1, false),
                UsersCommand::SetBoardMembership {
                    username: Some(json!("dev")),
                    board_id: Some(json!(5)),
                    is_active: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest { field: "is_active", .. }));
    }

    #[tokio::test]
    async fn set_membership_on_foreign_board_is_not_authenticated() {
        let mut boards = MockBoardRepository::new();
        boards
            .expect_find_board()
            .returning(|id| Ok(Some(board(id, 2))));
        boards.expect_add_member().times(0);
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Ok(Some(user(11, "dev", 1, false))));

        let svc = service(MockTeamRepository::new(), boards, users);
        let err = svc
            .set_board_membership(&caller(1, false), Some("dev"), Some("5"), Some(&json!(true)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated));
    }

    #[tokio::test]
    async fn deleting_admin_is_forbidden_and_deletes_nothing() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Ok(Some(user(10, "other-lead", 1, true))));
        users.expect_delete_user().times(0);

        let svc = service(MockTeamRepository::new(), MockBoardRepository::new(), users);
        let err = svc
            .execute(
                &caller(1, true),
                UsersCommand::DeleteMember {
                    username: Some("other-lead".into()),
                },
            )
            .await
            .unwrap_err();
        match err {
            Error::Forbidden { field, message } => {
                assert_eq!(field, "username");
                assert_eq!(message, "Team leaders cannot be deleted from their teams.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_requires_admin_caller() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().times(0);
        users.expect_delete_user().times(0);

        let svc = service(MockTeamRepository::new(), MockBoardRepository::new(), users);
        let err = svc
            .delete_member(&caller(1, false), Some("dev"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden { field: "auth", .. }));
    }

    #[tokio::test]
    async fn delete_removes_plain_member() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Ok(Some(user(11, "dev", 1, false))));
        users
            .expect_delete_user()
            .withf(|id| *id == 11)
            .times(1)
            .returning(|_| Ok(true));

        let svc = service(MockTeamRepository::new(), MockBoardRepository::new(), users);
        let msg = svc
            .delete_member(&caller(1, true), Some("dev"))
            .await
            .unwrap();
        assert_eq!(msg.msg, "Member has been deleted successfully.");
    }
}
