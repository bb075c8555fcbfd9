use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Energy per gram of each macro.
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARBS: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

/// RDA protein minimum, grams per kg of body weight.
const MIN_PROTEIN_G_PER_KG: f64 = 0.83;
const FAT_RATIO: f64 = 0.25;

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    fn bmr_offset(self) -> f64 {
        match self {
            Gender::Male => 5.0,
            Gender::Female => -161.0,
            // midpoint of the two
            Gender::Other => -78.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(UnknownVariant { kind: "gender", value: s.into() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "very_active" => Ok(ActivityLevel::VeryActive),
            _ => Err(UnknownVariant { kind: "activity level", value: s.into() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

impl Goal {
    /// Daily kcal adjustment, roughly 0.5 kg per week.
    pub fn calorie_modifier(self) -> i64 {
        match self {
            Goal::Lose => -500,
            Goal::Maintain => 0,
            Goal::Gain => 500,
        }
    }

    fn protein_ratio(self) -> f64 {
        match self {
            Goal::Lose | Goal::Gain => 0.25,
            Goal::Maintain => 0.20,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Goal::Lose => "lose",
            Goal::Maintain => "maintain",
            Goal::Gain => "gain",
        }
    }
}

impl FromStr for Goal {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lose" => Ok(Goal::Lose),
            "maintain" => Ok(Goal::Maintain),
            "gain" => Ok(Goal::Gain),
            _ => Err(UnknownVariant { kind: "goal", value: s.into() }),
        }
    }
}

/// Daily calorie and macro targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Targets {
    pub target_calories: u32,
    pub target_protein: u32,
    pub target_carbs: u32,
    pub target_fat: u32,
}

/// Rounds ties toward positive infinity.
fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Clamps into `0..=u32::MAX`.
fn non_negative(x: i64) -> u32 {
    u32::try_from(x.max(0)).unwrap_or(u32::MAX)
}

/// Mifflin-St Jeor basal metabolic rate, rounded to whole kcal.
pub fn basal_metabolic_rate(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> i64 {
    let bmr = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age) + gender.bmr_offset();
    round_half_up(bmr)
}

pub fn total_daily_energy_expenditure(bmr: i64, activity: ActivityLevel) -> i64 {
    round_half_up(bmr as f64 * activity.multiplier())
}

/// Derives daily targets from body stats.
///
/// Protein and fat are fixed shares of the calorie target, protein is lifted
/// to the RDA floor for the given weight, and carbs take whatever calories are
/// left. Every output is clamped into the `u32` range.
pub fn calculate_targets(
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    gender: Gender,
    activity: ActivityLevel,
    goal: Goal,
) -> Targets {
    let bmr = basal_metabolic_rate(weight_kg, height_cm, age, gender);
    let tdee = total_daily_energy_expenditure(bmr, activity);
    let calories = tdee.saturating_add(goal.calorie_modifier()).max(0);
    let kcal = calories as f64;

    let min_protein = round_half_up(weight_kg * MIN_PROTEIN_G_PER_KG);
    let protein = round_half_up(kcal * goal.protein_ratio() / KCAL_PER_G_PROTEIN).max(min_protein);
    let fat = round_half_up(kcal * FAT_RATIO / KCAL_PER_G_FAT);

    let carb_kcal = kcal - protein as f64 * KCAL_PER_G_PROTEIN - fat as f64 * KCAL_PER_G_FAT;
    let carbs = round_half_up(carb_kcal / KCAL_PER_G_CARBS);

    Targets {
        target_calories: non_negative(calories),
        target_protein: non_negative(protein),
        target_carbs: non_negative(carbs),
        target_fat: non_negative(fat),
    }
}
