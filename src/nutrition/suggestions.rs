use std::collections::HashSet;

use serde::Serialize;
use time::{Date, Duration};
use tracing::debug;
use uuid::Uuid;

use super::{FoodItem, MacroTotals, UserProfile};
use crate::storage::NutritionStore;

pub const DEFAULT_HISTORY_DAYS: u32 = 30;
pub const DEFAULT_MAX_SUGGESTIONS: usize = 3;

const OVER_BUDGET_FACTOR: f64 = 1.2;
const OVER_BUDGET_PENALTY: f64 = 50.0;
const MACRO_MATCH_WEIGHT: f64 = 30.0;
const BUDGET_FIT_BONUS: f64 = 20.0;
/// Below this share of the remaining calories a food counts as light.
const MEANINGFUL_PORTION: f64 = 0.3;
const DOMINANT_NEED_SHARE: f64 = 0.4;
const DOMINANT_FOOD_SHARE: f64 = 0.3;

/// What is still left of today's targets, floored at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RemainingNeeds {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodSuggestion {
    pub food: FoodItem,
    pub score: f64,
    pub reason: String,
}

pub fn calculate_remaining_needs(profile: &UserProfile, consumed: &MacroTotals) -> RemainingNeeds {
    let t = &profile.targets;
    RemainingNeeds {
        calories: (f64::from(t.target_calories) - consumed.calories).max(0.0),
        protein: (f64::from(t.target_protein) - consumed.protein).max(0.0),
        carbs: (f64::from(t.target_carbs) - consumed.carbs).max(0.0),
        fat: (f64::from(t.target_fat) - consumed.fat).max(0.0),
    }
}

/// Shares of protein, carbs and fat in a macro triple, or `None` when all are zero.
fn macro_shares(protein: f64, carbs: f64, fat: f64) -> Option<[f64; 3]> {
    let total = protein + carbs + fat;
    (total > 0.0).then(|| [protein / total, carbs / total, fat / total])
}

fn score_food(remaining: &RemainingNeeds, food: &FoodItem) -> (f64, String) {
    let mut score = 0.0;
    let mut labels: Vec<&str> = Vec::new();

    if food.calories > remaining.calories * OVER_BUDGET_FACTOR {
        score -= OVER_BUDGET_PENALTY;
    }

    let need = macro_shares(remaining.protein, remaining.carbs, remaining.fat);
    let have = macro_shares(food.protein, food.carbs, food.fat);
    if let (Some(need), Some(have)) = (need, have) {
        for (n, h) in need.iter().zip(have.iter()) {
            score += (1.0 - (h - n).abs()) * MACRO_MATCH_WEIGHT;
        }

        for (i, label) in ["High protein", "Good carbs", "Healthy fats"].into_iter().enumerate() {
            if need[i] > DOMINANT_NEED_SHARE && have[i] > DOMINANT_FOOD_SHARE {
                labels.push(label);
            }
        }
    }

    let portion_floor = remaining.calories * MEANINGFUL_PORTION;
    let fits_budget = food.calories <= remaining.calories && food.calories > portion_floor;
    if fits_budget {
        score += BUDGET_FIT_BONUS;
    }

    let reason = if !labels.is_empty() {
        labels.join(", ")
    } else if fits_budget {
        "Fits your budget".to_string()
    } else if food.calories < portion_floor {
        "Light option".to_string()
    } else {
        "Balanced meal".to_string()
    };

    (score, reason)
}

/// Ranks previously logged foods by how well they fill the remaining needs.
///
/// Foods are scored on calorie fit and on how closely their macro profile
/// mirrors the profile of what is still needed. The result is sorted by score,
/// holds at most one entry per food name and at most `max_suggestions` entries.
pub fn generate_suggestions(
    remaining: &RemainingNeeds,
    history: &[FoodItem],
    max_suggestions: usize,
) -> Vec<FoodSuggestion> {
    if history.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<FoodSuggestion> = history
        .iter()
        .map(|food| {
            let (score, reason) = score_food(remaining, food);
            FoodSuggestion {
                food: food.clone(),
                score,
                reason,
            }
        })
        .collect();

    // stable, so equal scores keep history order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen = HashSet::new();
    scored
        .into_iter()
        .filter(|s| seen.insert(s.food.name.clone()))
        .take(max_suggestions)
        .collect()
}

/// Gathers every food logged by `user` over the last `days` calendar days,
/// `today` included. Days are visited newest first; foods keep their
/// insertion order within a day.
pub async fn collect_food_history(
    store: &dyn NutritionStore,
    user: Uuid,
    today: Date,
    days: u32,
) -> anyhow::Result<Vec<FoodItem>> {
    let mut foods = Vec::new();
    for back in 0..days {
        let Some(date) = today.checked_sub(Duration::days(i64::from(back))) else {
            break;
        };
        if let Some(log) = store.daily_log(user, date).await? {
            foods.extend(log.foods);
        }
    }
    debug!(%user, days, count = foods.len(), "food history collected");
    Ok(foods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::{ActivityLevel, DailyLog, Gender, Goal, Targets};
    use crate::storage::MemoryStore;
    use time::macros::{date, datetime};

    fn food(name: &str, calories: f64, protein: f64, carbs: f64, fat: f64) -> FoodItem {
        FoodItem {
            id: format!("{name}-{calories}"),
            name: name.into(),
            calories,
            protein,
            carbs,
            fat,
            weight: 100.0,
            timestamp: datetime!(2026-10-19 08:00 UTC),
        }
    }

    fn remaining(calories: f64, protein: f64, carbs: f64, fat: f64) -> RemainingNeeds {
        RemainingNeeds { calories, protein, carbs, fat }
    }

    fn profile(targets: Targets) -> UserProfile {
        UserProfile {
            name: "Test".into(),
            height: 170.0,
            weight: 70.0,
            age: 30,
            gender: Gender::Other,
            goal: Goal::Maintain,
            activity_level: ActivityLevel::Light,
            dietary_preferences: vec![],
            targets,
        }
    }

    #[test]
    fn remaining_needs_subtract_and_floor_at_zero() {
        let p = profile(Targets {
            target_calories: 2000,
            target_protein: 100,
            target_carbs: 250,
            target_fat: 60,
        });
        let consumed = MacroTotals {
            calories: 2400.0,
            protein: 40.5,
            carbs: 250.0,
            fat: 10.0,
        };
        let r = calculate_remaining_needs(&p, &consumed);
        assert_eq!(r, remaining(0.0, 59.5, 0.0, 50.0));
    }

    #[test]
    fn remaining_needs_never_negative() {
        let p = profile(Targets::default());
        for c in [0.0, 1.0, 1e6] {
            let r = calculate_remaining_needs(
                &p,
                &MacroTotals { calories: c, protein: c, carbs: c, fat: c },
            );
            assert!(r.calories >= 0.0 && r.protein >= 0.0 && r.carbs >= 0.0 && r.fat >= 0.0);
        }
    }

    #[test]
    fn empty_history_gives_nothing() {
        assert!(generate_suggestions(&remaining(500.0, 30.0, 30.0, 10.0), &[], 3).is_empty());
        assert!(generate_suggestions(&RemainingNeeds::default(), &[], 3).is_empty());
    }

    #[test]
    fn chicken_beats_apple_when_protein_is_short() {
        let apple = food("Apple", 95.0, 0.0, 25.0, 0.0);
        let chicken = food("Chicken Breast", 165.0, 31.0, 0.0, 3.0);
        let out = generate_suggestions(&remaining(200.0, 20.0, 20.0, 5.0), &[apple, chicken], 3);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].food.name, "Chicken Breast");
        assert_eq!(out[1].food.name, "Apple");
        assert!(out[0].score > out[1].score);
        assert_eq!(out[0].reason, "High protein");
        assert_eq!(out[1].reason, "Good carbs");
    }

    #[test]
    fn oversized_food_is_penalised() {
        let r = remaining(300.0, 20.0, 20.0, 20.0);
        let (small, _) = score_food(&r, &food("Eggs", 150.0, 12.0, 1.0, 10.0));
        let (huge, _) = score_food(&r, &food("Eggs", 900.0, 12.0, 1.0, 10.0));
        // +20 budget bonus lost and -50 penalty applied, macro fit identical
        assert!((small - huge - 70.0).abs() < 1e-9);
    }

    #[test]
    fn reasons_follow_precedence() {
        // balanced needs: no macro label can fire
        let r = remaining(600.0, 30.0, 30.0, 30.0);
        assert_eq!(score_food(&r, &food("Dal", 300.0, 10.0, 10.0, 10.0)).1, "Fits your budget");
        assert_eq!(score_food(&r, &food("Cucumber", 20.0, 1.0, 3.0, 0.0)).1, "Light option");
        assert_eq!(score_food(&r, &food("Biryani", 800.0, 20.0, 90.0, 30.0)).1, "Balanced meal");

        // zero-macro foods skip the macro term entirely
        assert_eq!(score_food(&r, &food("Black coffee", 5.0, 0.0, 0.0, 0.0)).1, "Light option");
    }

    #[test]
    fn multiple_macro_labels_are_joined() {
        let r = remaining(800.0, 45.0, 45.0, 10.0);
        let (_, reason) = score_food(&r, &food("Rajma chawal", 400.0, 15.0, 20.0, 2.0));
        assert_eq!(reason, "High protein, Good carbs");
    }

    #[test]
    fn zero_remaining_macros_skip_macro_term() {
        let r = remaining(500.0, 0.0, 0.0, 0.0);
        let (score, reason) = score_food(&r, &food("Paneer", 300.0, 18.0, 4.0, 22.0));
        assert_eq!(score, BUDGET_FIT_BONUS);
        assert_eq!(reason, "Fits your budget");
    }

    #[test]
    fn duplicates_keep_the_best_scoring_entry() {
        let history = vec![
            food("Idli", 900.0, 4.0, 40.0, 1.0),
            food("Idli", 150.0, 4.0, 30.0, 1.0),
            food("idli", 150.0, 4.0, 30.0, 1.0),
        ];
        let out = generate_suggestions(&remaining(300.0, 10.0, 40.0, 5.0), &history, 5);

        let names: Vec<_> = out.iter().map(|s| s.food.name.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"Idli") && names.contains(&"idli"));
        let idli = out.iter().find(|s| s.food.name == "Idli").unwrap();
        assert_eq!(idli.food.calories, 150.0);
    }

    #[test]
    fn output_is_capped_and_unique() {
        let history: Vec<_> = (0..20)
            .map(|i| food(&format!("Food {}", i % 7), 100.0 + f64::from(i) * 10.0, 10.0, 20.0, 5.0))
            .collect();
        let r = remaining(700.0, 40.0, 60.0, 20.0);

        for max in [0, 1, 3, 10] {
            let out = generate_suggestions(&r, &history, max);
            assert!(out.len() <= max);
            let names: HashSet<_> = out.iter().map(|s| &s.food.name).collect();
            assert_eq!(names.len(), out.len());
        }
        assert_eq!(generate_suggestions(&r, &history, 10).len(), 7);
    }

    #[test]
    fn scores_are_sorted_descending() {
        let history = vec![
            food("Rice", 200.0, 4.0, 45.0, 0.5),
            food("Egg", 78.0, 6.0, 0.6, 5.0),
            food("Ghee", 900.0, 0.0, 0.0, 100.0),
            food("Curd", 98.0, 11.0, 3.4, 4.3),
        ];
        let out = generate_suggestions(&remaining(400.0, 30.0, 10.0, 10.0), &history, 4);
        assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(out.last().unwrap().food.name, "Ghee");
    }

    #[test]
    fn generating_twice_is_identical() {
        let history = vec![
            food("Poha", 250.0, 5.0, 45.0, 6.0),
            food("Chana", 270.0, 15.0, 45.0, 4.0),
            food("Poha", 250.0, 5.0, 45.0, 6.0),
        ];
        let r = remaining(600.0, 50.0, 80.0, 20.0);
        assert_eq!(generate_suggestions(&r, &history, 3), generate_suggestions(&r, &history, 3));
    }

    #[tokio::test]
    async fn history_spans_the_window_and_skips_missing_days() {
        let store = MemoryStore::default();
        let user = Uuid::new_v4();
        let today = date!(2026-10-19);

        store.add_food(user, today, food("Today A", 100.0, 1.0, 1.0, 1.0)).await.unwrap();
        store.add_food(user, today, food("Today B", 100.0, 1.0, 1.0, 1.0)).await.unwrap();
        store
            .add_food(user, date!(2026-10-17), food("Two days ago", 100.0, 1.0, 1.0, 1.0))
            .await
            .unwrap();
        // outside a 3-day window
        store
            .add_food(user, date!(2026-10-16), food("Too old", 100.0, 1.0, 1.0, 1.0))
            .await
            .unwrap();
        // someone else's log
        store
            .add_food(Uuid::new_v4(), today, food("Not mine", 100.0, 1.0, 1.0, 1.0))
            .await
            .unwrap();

        let foods = collect_food_history(&store, user, today, 3).await.unwrap();
        let names: Vec<_> = foods.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Today A", "Today B", "Two days ago"]);

        let none = collect_food_history(&store, user, today, 0).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn history_feeds_suggestions_end_to_end() {
        let store = MemoryStore::default();
        let user = Uuid::new_v4();
        let today = date!(2026-10-19);
        let mut log = DailyLog::empty(date!(2026-10-18));
        log.foods.push(food("Chicken Breast", 165.0, 31.0, 0.0, 3.0));
        log.foods.push(food("Apple", 95.0, 0.0, 25.0, 0.0));
        store.save_daily_log(user, log).await.unwrap();

        let history = collect_food_history(&store, user, today, DEFAULT_HISTORY_DAYS).await.unwrap();
        let out = generate_suggestions(&remaining(200.0, 20.0, 20.0, 5.0), &history, DEFAULT_MAX_SUGGESTIONS);
        assert_eq!(out[0].food.name, "Chicken Breast");
    }
}
