use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub auth_token_secret: String,
    /// Absent means the in-memory store is used.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub seed_path: Option<String>,
    pub log_format: LogFormat,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let log_format = match env::var("LOG_FORMAT").ok().as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(Error::Config(format!(
                    "Invalid value for LOG_FORMAT: {}",
                    other
                )))
            }
        };

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            auth_token_secret: get_env("AUTH_TOKEN_SECRET")?,
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            db_max_connections: get_env_parse_or("DB_MAX_CONNECTIONS", 10)?,
            seed_path: env::var("SEED_PATH").ok().filter(|v| !v.is_empty()),
            log_format,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
