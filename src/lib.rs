pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::repositories::{
    memory::MemoryStore, postgres::PgStore, BoardRepository, TeamRepository, UserRepository,
};
use crate::services::{auth_service::AuthService, membership_service::MembershipService};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub membership_service: MembershipService,
}

impl AppState {
    /// Wires every service to one store that serves all three repositories.
    pub fn new<S>(store: Arc<S>, auth_token_secret: &str) -> Self
    where
        S: TeamRepository + BoardRepository + UserRepository + 'static,
    {
        let users: Arc<dyn UserRepository> = store.clone();
        let auth_service = AuthService::new(users.clone(), auth_token_secret);
        let membership_service =
            MembershipService::new(store.clone(), store, users, auth_service.clone());

        Self {
            auth_service,
            membership_service,
        }
    }

    /// PostgreSQL when `DATABASE_URL` is set, otherwise the in-memory store
    /// (optionally seeded from `SEED_PATH`).
    pub async fn from_config(config: &Config) -> Result<Self> {
        if let Some(database_url) = &config.database_url {
            let pool = database::pool::create_pool(database_url, config.db_max_connections).await?;
            database::pool::run_migrations(&pool).await?;
            tracing::info!("using PostgreSQL store");
            return Ok(Self::new(Arc::new(PgStore::new(pool)), &config.auth_token_secret));
        }

        let store = match &config.seed_path {
            Some(path) => {
                tracing::info!(%path, "using in-memory store seeded from file");
                MemoryStore::from_seed_file(path).await?
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using an empty in-memory store");
                MemoryStore::new()
            }
        };
        Ok(Self::new(Arc::new(store), &config.auth_token_secret))
    }
}
