pub mod suggestions;
pub mod targets;

use serde::{Deserialize, Serialize};
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

pub use targets::{calculate_targets, ActivityLevel, Gender, Goal, Targets};

/// `YYYY-MM-DD`, the key format of daily logs.
pub const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");

pub fn parse_date(raw: &str) -> Result<Date, time::error::Parse> {
    Date::parse(raw, ISO_DATE)
}

/// Stored user profile. Targets are derived from the body stats and are
/// refreshed through [`UserProfile::recompute_targets`], never set by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub height: f64, // cm
    pub weight: f64, // kg
    pub age: u32,
    pub gender: Gender,
    pub goal: Goal,
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    #[serde(flatten)]
    pub targets: Targets,
}

impl UserProfile {
    pub fn recompute_targets(&mut self) {
        self.targets = calculate_targets(
            self.weight,
            self.height,
            self.age,
            self.gender,
            self.activity_level,
            self.goal,
        );
    }
}

/// A logged (or candidate) food entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub id: String,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub weight: f64, // grams
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// All foods logged on one calendar day, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub foods: Vec<FoodItem>,
}

impl DailyLog {
    pub fn empty(date: Date) -> Self {
        Self {
            date,
            foods: Vec::new(),
        }
    }

    pub fn totals(&self) -> MacroTotals {
        self.foods.iter().fold(MacroTotals::default(), |acc, f| MacroTotals {
            calories: acc.calories + f.calories,
            protein: acc.protein + f.protein,
            carbs: acc.carbs + f.carbs,
            fat: acc.fat + f.fat,
        })
    }
}

/// Sum of calories and macro grams, e.g. everything consumed today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}
