//! HTTP handlers for stock operations

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::stock::{AvailabilityResult, MovementInput, OrderLinesInput, StockService};
use crate::AppState;

fn stock_service(state: &AppState) -> StockService {
    StockService::new(state.db.clone(), state.config.stock.clone())
}

/// Explode order lines into their consolidated leaf requirement (preview)
pub async fn preview_requirement(
    State(state): State<AppState>,
    Json(input): Json<OrderLinesInput>,
) -> AppResult<Json<AvailabilityResult>> {
    let result = stock_service(&state).preview_requirement(&input.lines).await?;
    Ok(Json(result))
}

/// Explode order lines and check the requirement against on-hand stock
pub async fn check_availability(
    State(state): State<AppState>,
    Json(input): Json<OrderLinesInput>,
) -> AppResult<Json<AvailabilityResult>> {
    let result = stock_service(&state).check_availability(&input.lines).await?;
    Ok(Json(result))
}

/// Record an incoming purchase/delivery
pub async fn record_incoming(
    State(state): State<AppState>,
    Json(input): Json<MovementInput>,
) -> AppResult<Json<()>> {
    stock_service(&state).record_incoming(&input).await?;
    Ok(Json(()))
}

/// Record waste/spoilage
pub async fn record_waste(
    State(state): State<AppState>,
    Json(input): Json<MovementInput>,
) -> AppResult<Json<()>> {
    stock_service(&state).record_waste(&input).await?;
    Ok(Json(()))
}
