use axum::http::StatusCode;
use tracing::error;

use crate::storage::DuplicateFood;

/// Handler error shape: status plus a plain-text message.
pub type ApiError = (StatusCode, String);

/// Request input the core refuses to reason about.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InputError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{0} must be positive")]
    NotPositive(&'static str),
    #[error("{0} must not be negative")]
    Negative(&'static str),
    #[error("{0} must be at most {1}")]
    TooLarge(&'static str, f64),
    #[error("age must be between 1 and 120")]
    AgeOutOfRange,
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    Date(String),
}

impl From<InputError> for ApiError {
    fn from(e: InputError) -> Self {
        (StatusCode::BAD_REQUEST, e.to_string())
    }
}

pub fn internal(e: anyhow::Error) -> ApiError {
    error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Like [`internal`], but a duplicate food id becomes a 409.
pub fn store_error(e: anyhow::Error) -> ApiError {
    match e.downcast_ref::<DuplicateFood>() {
        Some(dup) => (StatusCode::CONFLICT, dup.to_string()),
        None => internal(e),
    }
}

pub fn not_found(what: &str) -> ApiError {
    (StatusCode::NOT_FOUND, format!("{what} not found"))
}

/// Parses a `YYYY-MM-DD` path or query value.
pub fn parse_date(raw: &str) -> Result<time::Date, InputError> {
    crate::nutrition::parse_date(raw).map_err(|_| InputError::Date(raw.to_string()))
}
