use time::Date;
use uuid::Uuid;

use super::dto::{DailySummary, Progress, SuggestionsResponse};
use crate::nutrition::{
    suggestions::{calculate_remaining_needs, collect_food_history, generate_suggestions},
    DailyLog,
};
use crate::storage::NutritionStore;

/// Consumed, remaining and progress figures for one day. `None` when the
/// user has no profile yet.
pub async fn daily_summary(
    store: &dyn NutritionStore,
    user: Uuid,
    date: Date,
) -> anyhow::Result<Option<DailySummary>> {
    let Some(profile) = store.profile(user).await? else {
        return Ok(None);
    };
    let log = store
        .daily_log(user, date)
        .await?
        .unwrap_or_else(|| DailyLog::empty(date));
    let consumed = log.totals();

    Ok(Some(DailySummary {
        date,
        remaining: calculate_remaining_needs(&profile, &consumed),
        progress: Progress::of(&consumed, &profile.targets),
        targets: profile.targets,
        consumed,
        foods: log.foods,
    }))
}

/// What to eat next on `today`, ranked from the last `days` of history.
pub async fn suggestions_for(
    store: &dyn NutritionStore,
    user: Uuid,
    today: Date,
    days: u32,
    limit: usize,
) -> anyhow::Result<Option<SuggestionsResponse>> {
    let Some(summary) = daily_summary(store, user, today).await? else {
        return Ok(None);
    };
    let history = collect_food_history(store, user, today, days).await?;
    Ok(Some(SuggestionsResponse {
        suggestions: generate_suggestions(&summary.remaining, &history, limit),
        remaining: summary.remaining,
    }))
}
