//! HTTP handlers for read-only catalog views
//!
//! Catalog CRUD is owned by the management panel; the order subsystem only
//! reads products and recipes from here.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::models::Product;

use crate::error::AppResult;
use crate::services::catalog::{CatalogService, RecipeLine};
use crate::AppState;

/// List all catalog products
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let products = CatalogService::new(state.db.clone()).list_products().await?;
    Ok(Json(products))
}

/// Get the direct recipe of a product
pub async fn get_product_recipe(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Vec<RecipeLine>>> {
    let recipe = CatalogService::new(state.db.clone())
        .get_recipe(product_id)
        .await?;
    Ok(Json(recipe))
}
