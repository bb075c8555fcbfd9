use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::{database::DEFAULT_SEARCH_LIMIT, FoodReference};
use crate::{
    auth::AuthUser,
    errors::{internal, not_found, parse_date, ApiError},
    nutrition::FoodItem,
    state::AppState,
};

const MAX_RESULTS: usize = 50;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LogReferenceQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub food: FoodReference,
    pub relevance: u8,
}

pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/foods/search", get(search))
        .route("/foods/popular", get(popular))
        .route("/foods/:id", get(get_food))
        .route("/foods/:id/log", post(log_reference))
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Json<Vec<SearchResult>> {
    let limit = q.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_RESULTS);
    let hits = state
        .foods
        .search(&q.q, limit)
        .into_iter()
        .map(|h| SearchResult {
            food: h.food.clone(),
            relevance: h.relevance,
        })
        .collect();
    Json(hits)
}

#[instrument(skip(state))]
pub async fn popular(
    State(state): State<AppState>,
    Query(q): Query<PopularQuery>,
) -> Json<Vec<FoodReference>> {
    let count = q.count.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_RESULTS);
    Json(state.foods.popular(count).to_vec())
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FoodReference>, ApiError> {
    state
        .foods
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("Food"))
}

/// Logs a 100 g portion of a reference food on `date` (default today).
#[instrument(skip(state))]
pub async fn log_reference(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Query(q): Query<LogReferenceQuery>,
) -> Result<(StatusCode, Json<FoodItem>), ApiError> {
    let now = OffsetDateTime::now_utc();
    let date = match q.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => now.date(),
    };
    let reference = state.foods.get(&id).ok_or_else(|| not_found("Food"))?;
    let food = reference.to_food_item(now);

    state
        .store
        .add_food(user_id, date, food.clone())
        .await
        .map_err(internal)?;

    info!(%user_id, %date, reference = %id, "reference food logged");
    Ok((StatusCode::CREATED, Json(food)))
}
