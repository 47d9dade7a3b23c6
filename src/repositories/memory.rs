//! In-memory identity store for local runs and tests.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use super::{BoardRepository, TeamRepository, UserRepository};
use crate::error::{Error, Result};
use crate::models::{board::Board, team::Team, user::User};
use crate::utils::crypto::hash_password;

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    teams: BTreeMap<i64, Team>,
    users: BTreeMap<i64, User>,
    boards: BTreeMap<i64, Board>,
    // (board_id, user_id)
    memberships: BTreeSet<(i64, i64)>,
}

impl State {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

/// Fixture format accepted by [`MemoryStore::from_seed_file`].
#[derive(Debug, Clone, Deserialize)]
pub struct SeedData {
    pub teams: Vec<SeedTeam>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedTeam {
    #[serde(default)]
    pub members: Vec<SeedUser>,
    #[serde(default)]
    pub boards: Vec<SeedBoard>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedBoard {
    pub name: String,
    /// Usernames in the board's active set.
    #[serde(default)]
    pub active: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn from_seed_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let seed: SeedData = serde_json::from_str(&raw)?;
        Self::from_seed(seed)
    }

    pub fn from_seed(seed: SeedData) -> Result<Self> {
        let store = Self::new();
        for seed_team in seed.teams {
            let team = store.create_team()?;
            for member in seed_team.members {
                let hashed = hash_password(&member.password)?;
                store.create_user(&member.username, &hashed, member.is_admin, team.id)?;
            }
            for seed_board in seed_team.boards {
                let board = store.create_board(&seed_board.name, team.id)?;
                for username in seed_board.active {
                    let user_id = store
                        .read()?
                        .users
                        .values()
                        .find(|u| u.username == username && u.team_id == team.id)
                        .map(|u| u.id)
                        .ok_or_else(|| {
                            Error::Config(format!(
                                "Seed board '{}' lists unknown member '{}'",
                                seed_board.name, username
                            ))
                        })?;
                    store.write()?.memberships.insert((board.id, user_id));
                }
            }
        }
        Ok(store)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| Error::Internal("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| Error::Internal("memory store lock poisoned".to_string()))
    }

    pub fn create_team(&self) -> Result<Team> {
        let mut state = self.write()?;
        let team = Team {
            id: state.allocate_id(),
            created_at: Utc::now(),
        };
        state.teams.insert(team.id, team.clone());
        Ok(team)
    }

    /// `password` must already be hashed.
    pub fn create_user(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
        team_id: i64,
    ) -> Result<User> {
        let mut state = self.write()?;
        if !state.teams.contains_key(&team_id) {
            return Err(Error::Internal(format!("team {} does not exist", team_id)));
        }
        if state.users.values().any(|u| u.username == username) {
            return Err(Error::Internal(format!(
                "username '{}' is already taken",
                username
            )));
        }
        let user = User {
            id: state.allocate_id(),
            username: username.to_string(),
            password: password.to_string(),
            is_admin,
            team_id,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn create_board(&self, name: &str, team_id: i64) -> Result<Board> {
        let mut state = self.write()?;
        if !state.teams.contains_key(&team_id) {
            return Err(Error::Internal(format!("team {} does not exist", team_id)));
        }
        let board = Board {
            id: state.allocate_id(),
            name: name.to_string(),
            team_id,
            created_at: Utc::now(),
        };
        state.boards.insert(board.id, board.clone());
        Ok(board)
    }

    /// Number of (board, user) pairs recorded for a board.
    pub fn membership_count(&self, board_id: i64) -> Result<usize> {
        Ok(self
            .read()?
            .memberships
            .iter()
            .filter(|(b, _)| *b == board_id)
            .count())
    }
}

#[async_trait]
impl TeamRepository for MemoryStore {
    async fn find_team(&self, id: i64) -> Result<Option<Team>> {
        Ok(self.read()?.teams.get(&id).cloned())
    }
}

#[async_trait]
impl BoardRepository for MemoryStore {
    async fn find_board(&self, id: i64) -> Result<Option<Board>> {
        Ok(self.read()?.boards.get(&id).cloned())
    }

    async fn active_user_ids(&self, board_id: i64) -> Result<Vec<i64>> {
        Ok(self
            .read()?
            .memberships
            .range((board_id, i64::MIN)..=(board_id, i64::MAX))
            .map(|(_, user_id)| *user_id)
            .collect())
    }

    async fn add_member(&self, board_id: i64, user_id: i64) -> Result<()> {
        self.write()?.memberships.insert((board_id, user_id));
        Ok(())
    }

    async fn remove_member(&self, board_id: i64, user_id: i64) -> Result<()> {
        self.write()?.memberships.remove(&(board_id, user_id));
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_by_team(&self, team_id: i64) -> Result<Vec<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .filter(|u| u.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn delete_user(&self, user_id: i64) -> Result<bool> {
        let mut state = self.write()?;
        let removed = state.users.remove(&user_id).is_some();
        state.memberships.retain(|(_, member)| *member != user_id);
        Ok(removed)
    }
}
