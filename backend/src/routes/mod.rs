//! Route definitions for the Restaurant Stock Management Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Stock operations
        .nest("/stock", stock_routes())
        // Order-event stock bindings
        .nest("/orders", order_routes())
        // Day control
        .nest("/days", day_routes())
        // Reports
        .nest("/reports", report_routes())
        // Read-only catalog views
        .nest("/products", catalog_routes())
}

/// Stock operation routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/requirement", post(handlers::preview_requirement))
        .route("/availability", post(handlers::check_availability))
        .route("/incoming", post(handlers::record_incoming))
        .route("/waste", post(handlers::record_waste))
}

/// Order stock binding routes
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/:order_id/complete", post(handlers::complete_order))
        .route("/:order_id/cancel", post(handlers::cancel_order))
        .route("/:order_id/return", post(handlers::return_order))
        .route("/:order_id/snapshot", get(handlers::get_order_snapshot))
}

/// Day control routes
fn day_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(handlers::day_status))
        .route("/open", post(handlers::open_day))
        .route("/close", post(handlers::close_day))
}

/// Report routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/deviation", get(handlers::get_deviation_report))
        .route("/low-stock", get(handlers::get_low_stock_report))
}

/// Catalog view routes
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products))
        .route("/:product_id/recipe", get(handlers::get_product_recipe))
}
