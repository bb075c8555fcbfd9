use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::foods::FoodDatabase;
use crate::storage::{MemoryStore, NutritionStore, PgStore, StorageBackend};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn NutritionStore>,
    pub foods: Arc<FoodDatabase>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store: Arc<dyn NutritionStore> = match config.storage {
            StorageBackend::Memory => {
                warn!("using in-memory store; data is lost on restart");
                Arc::new(MemoryStore::default())
            }
            StorageBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is not set")?;
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to database")?;
                sqlx::migrate!("./migrations")
                    .run(&db)
                    .await
                    .context("run migrations")?;
                Arc::new(PgStore::new(db))
            }
        };
        info!(backend = ?config.storage, "storage ready");

        let foods = match &config.food_db_path {
            Some(path) => FoodDatabase::load(path)?,
            None => {
                warn!("FOOD_DB_PATH not set; food search is empty");
                FoodDatabase::default()
            }
        };
        if foods.is_empty() {
            warn!("food database has no entries");
        } else {
            info!(count = foods.len(), "food database ready");
        }

        Ok(Self::from_parts(config, store, Arc::new(foods)))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn NutritionStore>,
        foods: Arc<FoodDatabase>,
    ) -> Self {
        Self {
            config,
            store,
            foods,
        }
    }

    /// Memory-backed state with a fixed token secret, for router tests.
    #[cfg(test)]
    pub fn fake(foods: FoodDatabase) -> Self {
        use crate::config::JwtConfig;

        let config = Arc::new(AppConfig {
            storage: StorageBackend::Memory,
            database_url: None,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
            },
            food_db_path: None,
            history_days: 30,
            max_suggestions: 3,
        });
        Self::from_parts(config, Arc::new(MemoryStore::default()), Arc::new(foods))
    }
}
