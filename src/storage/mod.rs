mod memory;
mod postgres;

use async_trait::async_trait;
use time::Date;
use uuid::Uuid;

use crate::nutrition::{DailyLog, FoodItem, UserProfile};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A food id already present on that day. Ids are unique per user and date.
#[derive(Debug, thiserror::Error)]
#[error("food {0} is already logged on that day")]
pub struct DuplicateFood(pub String);

/// Persistence for profiles and daily food logs, scoped per user.
///
/// One implementation is picked at startup and shared as
/// `Arc<dyn NutritionStore>`; nothing downstream knows which one it got.
#[async_trait]
pub trait NutritionStore: Send + Sync {
    async fn profile(&self, user: Uuid) -> anyhow::Result<Option<UserProfile>>;
    async fn save_profile(&self, user: Uuid, profile: &UserProfile) -> anyhow::Result<()>;

    /// `None` when nothing was logged on `date`.
    async fn daily_log(&self, user: Uuid, date: Date) -> anyhow::Result<Option<DailyLog>>;
    /// Replaces every food logged on `log.date`. Fails with [`DuplicateFood`]
    /// when two foods share an id.
    async fn save_daily_log(&self, user: Uuid, log: DailyLog) -> anyhow::Result<()>;
    /// Fails with [`DuplicateFood`] when `food.id` is already logged on `date`.
    async fn add_food(&self, user: Uuid, date: Date, food: FoodItem) -> anyhow::Result<()>;
    /// Returns `false` when no food with `food_id` was logged on `date`.
    async fn remove_food(&self, user: Uuid, date: Date, food_id: &str) -> anyhow::Result<bool>;
    /// Every non-empty log, newest date first.
    async fn all_logs(&self, user: Uuid) -> anyhow::Result<Vec<DailyLog>>;
}

/// Which [`NutritionStore`] the service runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "local" => Ok(Self::Memory),
            "postgres" | "remote" => Ok(Self::Postgres),
            other => anyhow::bail!("unknown storage backend: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse() {
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!(" Postgres ".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
        assert_eq!("remote".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
        assert!("redis".parse::<StorageBackend>().is_err());
    }
}
