mod database;
pub mod handlers;

use crate::state::AppState;
use axum::Router;

pub use database::{FoodDatabase, FoodReference};

pub fn router() -> Router<AppState> {
    handlers::food_routes()
}
