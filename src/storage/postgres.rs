use anyhow::Context;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::{DuplicateFood, NutritionStore};
use crate::nutrition::{DailyLog, FoodItem, Targets, UserProfile};

/// Postgres-backed store; tables come from `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    name: String,
    height: f64,
    weight: f64,
    age: i32,
    gender: String,
    goal: String,
    activity_level: String,
    dietary_preferences: Vec<String>,
    target_calories: i32,
    target_protein: i32,
    target_carbs: i32,
    target_fat: i32,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = anyhow::Error;

    fn try_from(r: ProfileRow) -> anyhow::Result<Self> {
        Ok(Self {
            name: r.name,
            height: r.height,
            weight: r.weight,
            age: u32::try_from(r.age).context("profile age")?,
            gender: r.gender.parse()?,
            goal: r.goal.parse()?,
            activity_level: r.activity_level.parse()?,
            dietary_preferences: r.dietary_preferences,
            targets: Targets {
                target_calories: u32::try_from(r.target_calories).context("target_calories")?,
                target_protein: u32::try_from(r.target_protein).context("target_protein")?,
                target_carbs: u32::try_from(r.target_carbs).context("target_carbs")?,
                target_fat: u32::try_from(r.target_fat).context("target_fat")?,
            },
        })
    }
}

#[derive(Debug, FromRow)]
struct FoodRow {
    date: Date,
    id: String,
    name: String,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    weight: f64,
    logged_at: OffsetDateTime,
}

impl From<FoodRow> for FoodItem {
    fn from(r: FoodRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            calories: r.calories,
            protein: r.protein,
            carbs: r.carbs,
            fat: r.fat,
            weight: r.weight,
            timestamp: r.logged_at,
        }
    }
}

const FOOD_COLUMNS: &str = "date, id, name, calories, protein, carbs, fat, weight, logged_at";

async fn insert_food_tx(
    tx: &mut Transaction<'_, Postgres>,
    user: Uuid,
    date: Date,
    food: &FoodItem,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO food_logs (user_id, date, id, name, calories, protein, carbs, fat, weight, logged_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(user)
    .bind(date)
    .bind(&food.id)
    .bind(&food.name)
    .bind(food.calories)
    .bind(food.protein)
    .bind(food.carbs)
    .bind(food.fat)
    .bind(food.weight)
    .bind(food.timestamp)
    .execute(&mut **tx)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            anyhow::Error::new(DuplicateFood(food.id.clone()))
        }
        _ => anyhow::Error::new(e).context(format!("insert food {}", food.id)),
    })?;
    Ok(())
}

/// Splits rows already ordered by date into one log per date.
fn group_by_date(rows: Vec<FoodRow>) -> Vec<DailyLog> {
    let mut logs: Vec<DailyLog> = Vec::new();
    for row in rows {
        match logs.last_mut() {
            Some(log) if log.date == row.date => log.foods.push(row.into()),
            _ => {
                let date = row.date;
                logs.push(DailyLog {
                    date,
                    foods: vec![row.into()],
                });
            }
        }
    }
    logs
}

#[async_trait]
impl NutritionStore for PgStore {
    async fn profile(&self, user: Uuid) -> anyhow::Result<Option<UserProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT name, height, weight, age, gender, goal, activity_level, dietary_preferences,
                   target_calories, target_protein, target_carbs, target_fat
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user)
        .fetch_optional(&self.db)
        .await
        .context("select profile")?;

        row.map(UserProfile::try_from).transpose()
    }

    async fn save_profile(&self, user: Uuid, profile: &UserProfile) -> anyhow::Result<()> {
        let t = &profile.targets;
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, name, height, weight, age, gender, goal, activity_level,
                                  dietary_preferences, target_calories, target_protein, target_carbs,
                                  target_fat, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, now())
            ON CONFLICT (user_id) DO UPDATE SET
                name = EXCLUDED.name,
                height = EXCLUDED.height,
                weight = EXCLUDED.weight,
                age = EXCLUDED.age,
                gender = EXCLUDED.gender,
                goal = EXCLUDED.goal,
                activity_level = EXCLUDED.activity_level,
                dietary_preferences = EXCLUDED.dietary_preferences,
                target_calories = EXCLUDED.target_calories,
                target_protein = EXCLUDED.target_protein,
                target_carbs = EXCLUDED.target_carbs,
                target_fat = EXCLUDED.target_fat,
                updated_at = now()
            "#,
        )
        .bind(user)
        .bind(&profile.name)
        .bind(profile.height)
        .bind(profile.weight)
        .bind(i32::try_from(profile.age)?)
        .bind(profile.gender.as_str())
        .bind(profile.goal.as_str())
        .bind(profile.activity_level.as_str())
        .bind(&profile.dietary_preferences)
        .bind(i32::try_from(t.target_calories)?)
        .bind(i32::try_from(t.target_protein)?)
        .bind(i32::try_from(t.target_carbs)?)
        .bind(i32::try_from(t.target_fat)?)
        .execute(&self.db)
        .await
        .context("upsert profile")?;
        Ok(())
    }

    async fn daily_log(&self, user: Uuid, date: Date) -> anyhow::Result<Option<DailyLog>> {
        let rows = sqlx::query_as::<_, FoodRow>(&format!(
            "SELECT {FOOD_COLUMNS} FROM food_logs WHERE user_id = $1 AND date = $2 ORDER BY seq ASC"
        ))
        .bind(user)
        .bind(date)
        .fetch_all(&self.db)
        .await
        .context("select daily log")?;

        Ok(group_by_date(rows).pop())
    }

    async fn save_daily_log(&self, user: Uuid, log: DailyLog) -> anyhow::Result<()> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        sqlx::query("DELETE FROM food_logs WHERE user_id = $1 AND date = $2")
            .bind(user)
            .bind(log.date)
            .execute(&mut *tx)
            .await
            .context("clear daily log")?;
        for food in &log.foods {
            insert_food_tx(&mut tx, user, log.date, food).await?;
        }
        tx.commit().await.context("commit tx")?;
        Ok(())
    }

    async fn add_food(&self, user: Uuid, date: Date, food: FoodItem) -> anyhow::Result<()> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        insert_food_tx(&mut tx, user, date, &food).await?;
        tx.commit().await.context("commit tx")?;
        Ok(())
    }

    async fn remove_food(&self, user: Uuid, date: Date, food_id: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM food_logs WHERE user_id = $1 AND date = $2 AND id = $3")
            .bind(user)
            .bind(date)
            .bind(food_id)
            .execute(&self.db)
            .await
            .context("delete food")?;
        Ok(res.rows_affected() > 0)
    }

    async fn all_logs(&self, user: Uuid) -> anyhow::Result<Vec<DailyLog>> {
        let rows = sqlx::query_as::<_, FoodRow>(&format!(
            "SELECT {FOOD_COLUMNS} FROM food_logs WHERE user_id = $1 ORDER BY date DESC, seq ASC"
        ))
        .bind(user)
        .fetch_all(&self.db)
        .await
        .context("select all logs")?;

        Ok(group_by_date(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn row(date: Date, id: &str) -> FoodRow {
        FoodRow {
            date,
            id: id.into(),
            name: id.to_uppercase(),
            calories: 10.0,
            protein: 1.0,
            carbs: 1.0,
            fat: 1.0,
            weight: 10.0,
            logged_at: datetime!(2026-10-19 10:00 UTC),
        }
    }

    #[test]
    fn rows_group_into_logs_in_query_order() {
        let logs = group_by_date(vec![
            row(date!(2026-10-19), "a"),
            row(date!(2026-10-19), "b"),
            row(date!(2026-10-17), "c"),
        ]);
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].date, date!(2026-10-19));
        assert_eq!(logs[0].foods.iter().map(|f| f.id.as_str()).collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(logs[1].foods[0].name, "C");
        assert!(group_by_date(Vec::new()).is_empty());
    }

    #[test]
    fn profile_rows_with_unknown_enums_are_rejected() {
        let row = ProfileRow {
            name: "x".into(),
            height: 160.0,
            weight: 55.0,
            age: 28,
            gender: "female".into(),
            goal: "shred".into(),
            activity_level: "light".into(),
            dietary_preferences: vec![],
            target_calories: 1800,
            target_protein: 90,
            target_carbs: 200,
            target_fat: 50,
        };
        let err = UserProfile::try_from(row).unwrap_err();
        assert!(err.to_string().contains("goal"));
    }
}
