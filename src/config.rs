use std::path::PathBuf;

use crate::nutrition::suggestions::{DEFAULT_HISTORY_DAYS, DEFAULT_MAX_SUGGESTIONS};
use crate::storage::StorageBackend;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub food_db_path: Option<PathBuf>,
    pub history_days: u32,
    pub max_suggestions: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = var("DATABASE_URL").filter(|v| !v.trim().is_empty());
        let storage = match var("STORAGE_BACKEND") {
            Some(raw) => raw.parse()?,
            None if database_url.is_some() => StorageBackend::Postgres,
            None => StorageBackend::Memory,
        };
        if storage == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("STORAGE_BACKEND=postgres requires DATABASE_URL");
        }

        let jwt = JwtConfig {
            secret: var("JWT_SECRET").ok_or_else(|| anyhow::anyhow!("JWT_SECRET is not set"))?,
            issuer: var("JWT_ISSUER").unwrap_or_else(|| "nibble".into()),
            audience: var("JWT_AUDIENCE").unwrap_or_else(|| "nibble-users".into()),
        };

        Ok(Self {
            storage,
            database_url,
            jwt,
            food_db_path: var("FOOD_DB_PATH").map(PathBuf::from),
            history_days: var("HISTORY_DAYS")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(DEFAULT_HISTORY_DAYS),
            max_suggestions: var("MAX_SUGGESTIONS")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(DEFAULT_MAX_SUGGESTIONS),
        })
    }
}
