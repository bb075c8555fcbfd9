use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::dto::{DailySummary, NewFood, SuggestionQuery, SuggestionsResponse, SummaryQuery};
use super::services::{daily_summary, suggestions_for};
use crate::{
    auth::AuthUser,
    errors::{internal, not_found, parse_date, store_error, ApiError},
    nutrition::{DailyLog, FoodItem},
    state::AppState,
};

/// Longest lookback the suggestions endpoint will walk.
const MAX_HISTORY_DAYS: u32 = 365;

pub fn log_routes() -> Router<AppState> {
    Router::new()
        .route("/logs", get(list_logs))
        .route("/logs/:date", get(get_log).put(replace_log))
        .route("/logs/:date/foods", post(add_food))
        .route("/logs/:date/foods/:food_id", delete(remove_food))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(summary))
        .route("/suggestions", get(suggestions))
}

fn today() -> time::Date {
    OffsetDateTime::now_utc().date()
}

#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<DailyLog>>, ApiError> {
    let logs = state.store.all_logs(user_id).await.map_err(internal)?;
    Ok(Json(logs))
}

#[instrument(skip(state))]
pub async fn get_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> Result<Json<DailyLog>, ApiError> {
    let date = parse_date(&date)?;
    let log = state
        .store
        .daily_log(user_id, date)
        .await
        .map_err(internal)?
        .unwrap_or_else(|| DailyLog::empty(date));
    Ok(Json(log))
}

/// Replaces everything logged on `date` with the given foods.
#[instrument(skip(state, payload))]
pub async fn replace_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
    Json(payload): Json<Vec<NewFood>>,
) -> Result<Json<DailyLog>, ApiError> {
    let date = parse_date(&date)?;
    let now = OffsetDateTime::now_utc();
    let foods = payload
        .into_iter()
        .map(|f| f.into_food_item(now))
        .collect::<Result<Vec<_>, _>>()?;
    let log = DailyLog { date, foods };
    state
        .store
        .save_daily_log(user_id, log.clone())
        .await
        .map_err(store_error)?;

    info!(%user_id, %date, count = log.foods.len(), "daily log replaced");
    Ok(Json(log))
}

#[instrument(skip(state, payload))]
pub async fn add_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
    Json(payload): Json<NewFood>,
) -> Result<(StatusCode, Json<FoodItem>), ApiError> {
    let date = parse_date(&date)?;
    let food = payload.into_food_item(OffsetDateTime::now_utc())?;
    state
        .store
        .add_food(user_id, date, food.clone())
        .await
        .map_err(store_error)?;

    info!(%user_id, %date, food_id = %food.id, calories = food.calories, "food logged");
    Ok((StatusCode::CREATED, Json(food)))
}

#[instrument(skip(state))]
pub async fn remove_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((date, food_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let date = parse_date(&date)?;
    let removed = state
        .store
        .remove_food(user_id, date, &food_id)
        .await
        .map_err(internal)?;
    if !removed {
        warn!(%user_id, %date, %food_id, "remove_food: no such entry");
        return Err(not_found("Food"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<SummaryQuery>,
) -> Result<Json<DailySummary>, ApiError> {
    let date = match q.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => today(),
    };
    daily_summary(state.store.as_ref(), user_id, date)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found("Profile"))
}

#[instrument(skip(state))]
pub async fn suggestions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<SuggestionQuery>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    let days = q.days.unwrap_or(state.config.history_days).min(MAX_HISTORY_DAYS);
    let limit = q.limit.unwrap_or(state.config.max_suggestions);

    let out = suggestions_for(state.store.as_ref(), user_id, today(), days, limit)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("Profile"))?;

    info!(%user_id, days, count = out.suggestions.len(), "suggestions generated");
    Ok(Json(out))
}
