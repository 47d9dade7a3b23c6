//! Identity store interfaces.
//!
//! Handlers never reach for a global connection; they receive these traits
//! through [`crate::AppState`]. [`postgres::PgStore`] backs production and
//! [`memory::MemoryStore`] backs local runs and tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{board::Board, team::Team, user::User};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TeamRepository: Send + Sync {
    async fn find_team(&self, id: i64) -> Result<Option<Team>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait BoardRepository: Send + Sync {
    async fn find_board(&self, id: i64) -> Result<Option<Board>>;

    /// Ids of users in the board's active set.
    async fn active_user_ids(&self, board_id: i64) -> Result<Vec<i64>>;

    /// Adds a user to the active set. Adding an existing member is a no-op.
    async fn add_member(&self, board_id: i64, user_id: i64) -> Result<()>;

    /// Removes a user from the active set. Removing a non-member is a no-op.
    async fn remove_member(&self, board_id: i64, user_id: i64) -> Result<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Members of a team ordered by id.
    async fn list_by_team(&self, team_id: i64) -> Result<Vec<User>>;

    /// Deletes the user and their board memberships. Returns whether a row
    /// was removed.
    async fn delete_user(&self, user_id: i64) -> Result<bool>;
}
