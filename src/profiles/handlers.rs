use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::ProfileInput;
use crate::{
    auth::AuthUser,
    errors::{internal, not_found, ApiError},
    nutrition::{Targets, UserProfile},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(put_profile))
}

pub fn target_routes() -> Router<AppState> {
    Router::new().route("/targets/calculate", post(calculate))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserProfile>, ApiError> {
    state
        .store
        .profile(user_id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found("Profile"))
}

/// Saves the profile with freshly derived targets.
#[instrument(skip(state, payload))]
pub async fn put_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ProfileInput>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = payload.into_profile()?;
    state
        .store
        .save_profile(user_id, &profile)
        .await
        .map_err(internal)?;

    info!(
        %user_id,
        calories = profile.targets.target_calories,
        protein = profile.targets.target_protein,
        "profile saved"
    );
    Ok(Json(profile))
}

#[instrument(skip(payload))]
pub async fn calculate(Json(payload): Json<ProfileInput>) -> Result<Json<Targets>, ApiError> {
    payload.validate()?;
    Ok(Json(payload.targets()))
}
