use async_trait::async_trait;
use sqlx::PgPool;

use super::{BoardRepository, TeamRepository, UserRepository};
use crate::error::Result;
use crate::models::{board::Board, team::Team, user::User};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamRepository for PgStore {
    async fn find_team(&self, id: i64) -> Result<Option<Team>> {
        let team = sqlx::query_as::<_, Team>("SELECT id, created_at FROM teams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(team)
    }
}

#[async_trait]
impl BoardRepository for PgStore {
    async fn find_board(&self, id: i64) -> Result<Option<Board>> {
        let board = sqlx::query_as::<_, Board>(
            "SELECT id, name, team_id, created_at FROM boards WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(board)
    }

    async fn active_user_ids(&self, board_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM board_users WHERE board_id = $1 ORDER BY user_id",
        )
        .bind(board_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn add_member(&self, board_id: i64, user_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO board_users (board_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (board_id, user_id) DO NOTHING
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_member(&self, board_id: i64, user_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM board_users WHERE board_id = $1 AND user_id = $2")
            .bind(board_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, is_admin, team_id, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_by_team(&self, team_id: i64) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, is_admin, team_id, created_at
            FROM users
            WHERE team_id = $1
            ORDER BY id
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn delete_user(&self, user_id: i64) -> Result<bool> {
        // board_users rows go with the user via ON DELETE CASCADE
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
