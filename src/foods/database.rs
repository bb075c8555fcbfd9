use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::nutrition::FoodItem;

pub const DEFAULT_SEARCH_LIMIT: usize = 10;
const MIN_QUERY_LEN: usize = 2;

/// One entry of the static food table. Nutrients are per 100 g unless
/// prefixed with `serving`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodReference {
    pub id: String,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    pub serving_unit: String,
    pub serving_calories: f64,
    pub serving_protein: f64,
    pub serving_carbs: f64,
    pub serving_fat: f64,
    #[serde(default)]
    pub source: String,
}

impl FoodReference {
    /// A loggable 100 g portion of this food.
    pub fn to_food_item(&self, now: OffsetDateTime) -> FoodItem {
        FoodItem {
            id: Uuid::new_v4().to_string(),
            name: self.name.clone(),
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            weight: 100.0,
            timestamp: now,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchHit<'a> {
    pub food: &'a FoodReference,
    pub relevance: u8,
}

/// Read-only food table with name search.
#[derive(Debug, Default)]
pub struct FoodDatabase {
    foods: Vec<FoodReference>,
}

impl FoodDatabase {
    pub fn new(foods: Vec<FoodReference>) -> Self {
        Self { foods }
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read food database {}", path.display()))?;
        let foods: Vec<FoodReference> = serde_json::from_str(&raw)
            .with_context(|| format!("parse food database {}", path.display()))?;
        info!(count = foods.len(), path = %path.display(), "food database loaded");
        Ok(Self::new(foods))
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FoodReference> {
        self.foods.iter().find(|f| f.id == id)
    }

    /// First `count` entries in table order.
    pub fn popular(&self, count: usize) -> &[FoodReference] {
        &self.foods[..count.min(self.foods.len())]
    }

    /// Case-insensitive name search. Exact names rank first, then prefixes,
    /// then names with a word starting with the query, then substrings.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit<'_>> {
        let term = query.trim().to_lowercase();
        if term.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit<'_>> = self
            .foods
            .iter()
            .filter_map(|food| {
                relevance(&food.name.to_lowercase(), &term).map(|relevance| SearchHit { food, relevance })
            })
            .collect();
        hits.sort_by(|a, b| b.relevance.cmp(&a.relevance));
        hits.truncate(limit);
        hits
    }
}

fn relevance(name: &str, term: &str) -> Option<u8> {
    if name == term {
        Some(100)
    } else if name.starts_with(term) {
        Some(90)
    } else if name.split_whitespace().any(|w| w.starts_with(term)) {
        Some(80)
    } else if name.contains(term) {
        Some(70)
    } else {
        None
    }
}
