//! HTTP handlers for the day-control endpoint

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::business_day::{BusinessDayService, DayStatus, DayTransitionResult};
use crate::AppState;

/// Report whether today is open for stock bookkeeping
pub async fn day_status(State(state): State<AppState>) -> AppResult<Json<DayStatus>> {
    let status = BusinessDayService::new(state.db.clone()).day_status().await?;
    Ok(Json(status))
}

/// Open today's movement records
pub async fn open_day(State(state): State<AppState>) -> AppResult<Json<DayTransitionResult>> {
    let result = BusinessDayService::new(state.db.clone()).open_day().await?;
    Ok(Json(result))
}

/// Close today's movement records
pub async fn close_day(State(state): State<AppState>) -> AppResult<Json<DayTransitionResult>> {
    let result = BusinessDayService::new(state.db.clone()).close_day().await?;
    Ok(Json(result))
}
