//! HTTP handlers for the order-event stock bindings
//!
//! Order lifecycle itself (status transitions, payment) is handled by the
//! order subsystem; these endpoints are called at its status transitions.
//! The caller guarantees completion and cancellation/return are never in
//! flight concurrently for the same order.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::models::StockSnapshotLine;

use crate::error::AppResult;
use crate::services::stock::{OrderLinesInput, OrderStockResult, StockService};
use crate::AppState;

fn stock_service(state: &AppState) -> StockService {
    StockService::new(state.db.clone(), state.config.stock.clone())
}

/// Consume stock for a completed order
pub async fn complete_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<OrderLinesInput>,
) -> AppResult<Json<OrderStockResult>> {
    let result = stock_service(&state)
        .complete_order(order_id, &input.lines)
        .await?;
    Ok(Json(result))
}

/// Restore stock for a cancelled order from its completion snapshot
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderStockResult>> {
    let result = stock_service(&state).cancel_order(order_id).await?;
    Ok(Json(result))
}

/// Restore stock for returned order items
pub async fn return_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<OrderLinesInput>,
) -> AppResult<Json<OrderStockResult>> {
    let result = stock_service(&state)
        .return_order(order_id, &input.lines)
        .await?;
    Ok(Json(result))
}

/// Leaf quantities consumed by a completed order
pub async fn get_order_snapshot(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockSnapshotLine>>> {
    let snapshot = stock_service(&state).get_snapshot(order_id).await?;
    Ok(Json(snapshot))
}
