use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::errors::InputError;
use crate::nutrition::{
    iso_date, suggestions::FoodSuggestion, suggestions::RemainingNeeds, FoodItem, MacroTotals,
    Targets,
};

const DEFAULT_PORTION_G: f64 = 100.0;

/// A food to append to a day's log. `id` and `timestamp` are filled in
/// when the client leaves them out.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFood {
    pub id: Option<String>,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub weight: Option<f64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

impl NewFood {
    pub fn into_food_item(self, now: OffsetDateTime) -> Result<FoodItem, InputError> {
        if self.name.trim().is_empty() {
            return Err(InputError::Empty("name"));
        }
        for (field, value) in [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
            ("weight", self.weight.unwrap_or(DEFAULT_PORTION_G)),
        ] {
            if !(value >= 0.0) {
                return Err(InputError::Negative(field));
            }
        }

        Ok(FoodItem {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: self.name.trim().to_string(),
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            weight: self.weight.unwrap_or(DEFAULT_PORTION_G),
            timestamp: self.timestamp.unwrap_or(now),
        })
    }
}

/// Percent of each target consumed so far. Zero targets report zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

fn percent(consumed: f64, target: u32) -> f64 {
    if target == 0 {
        0.0
    } else {
        consumed / f64::from(target) * 100.0
    }
}

impl Progress {
    pub fn of(consumed: &MacroTotals, targets: &Targets) -> Self {
        Self {
            calories: percent(consumed.calories, targets.target_calories),
            protein: percent(consumed.protein, targets.target_protein),
            carbs: percent(consumed.carbs, targets.target_carbs),
            fat: percent(consumed.fat, targets.target_fat),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DailySummary {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub foods: Vec<FoodItem>,
    pub consumed: MacroTotals,
    pub targets: Targets,
    pub remaining: RemainingNeeds,
    pub progress: Progress,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub remaining: RemainingNeeds,
    pub suggestions: Vec<FoodSuggestion>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    pub days: Option<u32>,
    pub limit: Option<usize>,
}
