use serde::Deserialize;

use crate::errors::InputError;
use crate::nutrition::{calculate_targets, ActivityLevel, Gender, Goal, Targets, UserProfile};

const MAX_HEIGHT_CM: f64 = 300.0;
const MAX_WEIGHT_KG: f64 = 500.0;

/// Profile as submitted by the client. Targets are never accepted from the
/// outside; they are derived on save.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    #[serde(default)]
    pub name: String,
    pub height: f64,
    pub weight: f64,
    pub age: u32,
    pub gender: Gender,
    pub goal: Goal,
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
}

impl ProfileInput {
    pub fn validate(&self) -> Result<(), InputError> {
        if !(self.height > 0.0) {
            return Err(InputError::NotPositive("height"));
        }
        if !(self.weight > 0.0) {
            return Err(InputError::NotPositive("weight"));
        }
        if self.height > MAX_HEIGHT_CM {
            return Err(InputError::TooLarge("height", MAX_HEIGHT_CM));
        }
        if self.weight > MAX_WEIGHT_KG {
            return Err(InputError::TooLarge("weight", MAX_WEIGHT_KG));
        }
        if !(1..=120).contains(&self.age) {
            return Err(InputError::AgeOutOfRange);
        }
        Ok(())
    }

    pub fn targets(&self) -> Targets {
        calculate_targets(
            self.weight,
            self.height,
            self.age,
            self.gender,
            self.activity_level,
            self.goal,
        )
    }

    pub fn into_profile(self) -> Result<UserProfile, InputError> {
        if self.name.trim().is_empty() {
            return Err(InputError::Empty("name"));
        }
        self.validate()?;
        let mut profile = UserProfile {
            name: self.name.trim().to_string(),
            height: self.height,
            weight: self.weight,
            age: self.age,
            gender: self.gender,
            goal: self.goal,
            activity_level: self.activity_level,
            dietary_preferences: self.dietary_preferences,
            targets: Targets::default(),
        };
        profile.recompute_targets();
        Ok(profile)
    }
}
