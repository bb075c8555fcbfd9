use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use time::Date;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DuplicateFood, NutritionStore};
use crate::nutrition::{DailyLog, FoodItem, UserProfile};

#[derive(Default)]
struct UserData {
    profile: Option<UserProfile>,
    logs: BTreeMap<Date, Vec<FoodItem>>,
}

/// In-process store. Contents live as long as the process does.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, UserData>>,
}

#[async_trait]
impl NutritionStore for MemoryStore {
    async fn profile(&self, user: Uuid) -> anyhow::Result<Option<UserProfile>> {
        let users = self.users.read().await;
        Ok(users.get(&user).and_then(|u| u.profile.clone()))
    }

    async fn save_profile(&self, user: Uuid, profile: &UserProfile) -> anyhow::Result<()> {
        let mut users = self.users.write().await;
        users.entry(user).or_default().profile = Some(profile.clone());
        Ok(())
    }

    async fn daily_log(&self, user: Uuid, date: Date) -> anyhow::Result<Option<DailyLog>> {
        let users = self.users.read().await;
        let log = users
            .get(&user)
            .and_then(|u| u.logs.get(&date))
            .filter(|foods| !foods.is_empty())
            .map(|foods| DailyLog {
                date,
                foods: foods.clone(),
            });
        Ok(log)
    }

    async fn save_daily_log(&self, user: Uuid, log: DailyLog) -> anyhow::Result<()> {
        let mut ids = HashSet::new();
        if let Some(dup) = log.foods.iter().find(|f| !ids.insert(f.id.clone())) {
            return Err(DuplicateFood(dup.id.clone()).into());
        }
        let mut users = self.users.write().await;
        users.entry(user).or_default().logs.insert(log.date, log.foods);
        Ok(())
    }

    async fn add_food(&self, user: Uuid, date: Date, food: FoodItem) -> anyhow::Result<()> {
        let mut users = self.users.write().await;
        let foods = users.entry(user).or_default().logs.entry(date).or_default();
        if foods.iter().any(|f| f.id == food.id) {
            return Err(DuplicateFood(food.id).into());
        }
        foods.push(food);
        Ok(())
    }

    async fn remove_food(&self, user: Uuid, date: Date, food_id: &str) -> anyhow::Result<bool> {
        let mut users = self.users.write().await;
        let Some(foods) = users.get_mut(&user).and_then(|u| u.logs.get_mut(&date)) else {
            return Ok(false);
        };
        let before = foods.len();
        foods.retain(|f| f.id != food_id);
        Ok(foods.len() != before)
    }

    async fn all_logs(&self, user: Uuid) -> anyhow::Result<Vec<DailyLog>> {
        let users = self.users.read().await;
        let Some(data) = users.get(&user) else {
            return Ok(Vec::new());
        };
        Ok(data
            .logs
            .iter()
            .rev()
            .filter(|(_, foods)| !foods.is_empty())
            .map(|(date, foods)| DailyLog {
                date: *date,
                foods: foods.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::{ActivityLevel, Gender, Goal, Targets};
    use time::macros::{date, datetime};

    fn food(id: &str) -> FoodItem {
        FoodItem {
            id: id.into(),
            name: format!("food {id}"),
            calories: 100.0,
            protein: 5.0,
            carbs: 10.0,
            fat: 2.0,
            weight: 50.0,
            timestamp: datetime!(2026-10-19 09:30 UTC),
        }
    }

    #[tokio::test]
    async fn profile_roundtrip_is_per_user() {
        let store = MemoryStore::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let profile = UserProfile {
            name: "Ravi".into(),
            height: 175.0,
            weight: 72.0,
            age: 33,
            gender: Gender::Male,
            goal: Goal::Lose,
            activity_level: ActivityLevel::Light,
            dietary_preferences: vec!["vegetarian".into()],
            targets: Targets::default(),
        };

        assert!(store.profile(a).await.unwrap().is_none());
        store.save_profile(a, &profile).await.unwrap();
        assert_eq!(store.profile(a).await.unwrap(), Some(profile));
        assert!(store.profile(b).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_food_creates_log_lazily_and_keeps_order() {
        let store = MemoryStore::default();
        let user = Uuid::new_v4();
        let day = date!(2026-10-19);

        assert!(store.daily_log(user, day).await.unwrap().is_none());
        store.add_food(user, day, food("1")).await.unwrap();
        store.add_food(user, day, food("2")).await.unwrap();

        let log = store.daily_log(user, day).await.unwrap().unwrap();
        assert_eq!(log.date, day);
        let ids: Vec<_> = log.foods.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[tokio::test]
    async fn remove_food_reports_whether_anything_went() {
        let store = MemoryStore::default();
        let user = Uuid::new_v4();
        let day = date!(2026-10-19);
        store.add_food(user, day, food("1")).await.unwrap();

        assert!(!store.remove_food(user, day, "nope").await.unwrap());
        assert!(!store.remove_food(user, date!(2026-10-18), "1").await.unwrap());
        assert!(store.remove_food(user, day, "1").await.unwrap());
        // emptied days read as missing
        assert!(store.daily_log(user, day).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_daily_log_replaces_the_day() {
        let store = MemoryStore::default();
        let user = Uuid::new_v4();
        let day = date!(2026-10-19);
        store.add_food(user, day, food("old")).await.unwrap();

        store
            .save_daily_log(user, DailyLog { date: day, foods: vec![food("new")] })
            .await
            .unwrap();
        let log = store.daily_log(user, day).await.unwrap().unwrap();
        assert_eq!(log.foods.len(), 1);
        assert_eq!(log.foods[0].id, "new");
    }

    #[tokio::test]
    async fn all_logs_are_newest_first_without_empty_days() {
        let store = MemoryStore::default();
        let user = Uuid::new_v4();
        store.add_food(user, date!(2026-10-01), food("a")).await.unwrap();
        store.add_food(user, date!(2026-10-19), food("b")).await.unwrap();
        store.add_food(user, date!(2026-10-10), food("c")).await.unwrap();
        store.remove_food(user, date!(2026-10-10), "c").await.unwrap();

        let dates: Vec<_> = store.all_logs(user).await.unwrap().iter().map(|l| l.date).collect();
        assert_eq!(dates, [date!(2026-10-19), date!(2026-10-01)]);
        assert!(store.all_logs(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn food_ids_are_unique_within_a_day() {
        let store = MemoryStore::default();
        let user = Uuid::new_v4();
        let day = date!(2026-10-19);
        store.add_food(user, day, food("idli")).await.unwrap();

        let err = store.add_food(user, day, food("idli")).await.unwrap_err();
        assert!(err.downcast_ref::<DuplicateFood>().is_some());
        // another day, or another user, may reuse it
        store.add_food(user, date!(2026-10-20), food("idli")).await.unwrap();
        store.add_food(Uuid::new_v4(), day, food("idli")).await.unwrap();

        let err = store
            .save_daily_log(user, DailyLog { date: day, foods: vec![food("a"), food("a")] })
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<DuplicateFood>().is_some());
        // a rejected replace leaves the day untouched
        let log = store.daily_log(user, day).await.unwrap().unwrap();
        assert_eq!(log.foods[0].id, "idli");
    }
}
