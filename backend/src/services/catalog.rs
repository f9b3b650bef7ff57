//! Catalog service: loads the product/recipe graph for stock computations
//!
//! Catalog CRUD lives in the management panel outside this platform; this
//! service is a read-only consumer. The graph is re-read fresh for each
//! explosion call, so recipe edits take effect on the next order.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::catalog::CatalogGraph;
use shared::models::{Product, ProductComponent, ProductType};

use crate::error::{AppError, AppResult};

/// Read-only access to products and recipe components
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

/// Row for product queries
#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    product_type: String,
    cost: Decimal,
    unit: String,
    min_stock: Decimal,
    avg_purchase_quantity: Decimal,
}

impl ProductRow {
    fn into_product(self) -> AppResult<Product> {
        let product_type = ProductType::parse(&self.product_type).ok_or_else(|| {
            AppError::Internal(format!(
                "unknown product type '{}' for product {}",
                self.product_type, self.id
            ))
        })?;
        Ok(Product {
            id: self.id,
            name: self.name,
            product_type,
            cost: self.cost,
            unit: self.unit,
            min_stock: self.min_stock,
            avg_purchase_quantity: self.avg_purchase_quantity,
        })
    }
}

/// Row for recipe component queries
#[derive(Debug, FromRow)]
struct ComponentRow {
    product_id: Uuid,
    component_product_id: Uuid,
    quantity_per_unit: Decimal,
}

/// One recipe line with the component product resolved for display
#[derive(Debug, Serialize, FromRow)]
pub struct RecipeLine {
    pub component_product_id: Uuid,
    pub component_name: String,
    pub component_type: String,
    pub quantity_per_unit: Decimal,
    pub unit: String,
}

impl CatalogService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Load the whole catalog into an in-memory graph
    ///
    /// Construction validates component references, multipliers and empty
    /// recipes; failures surface as fatal configuration errors.
    pub async fn load_graph(&self) -> AppResult<CatalogGraph> {
        let product_rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, product_type, cost, unit, min_stock, avg_purchase_quantity
            FROM products
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let component_rows = sqlx::query_as::<_, ComponentRow>(
            r#"
            SELECT product_id, component_product_id, quantity_per_unit
            FROM product_components
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let products = product_rows
            .into_iter()
            .map(ProductRow::into_product)
            .collect::<AppResult<Vec<Product>>>()?;

        let components = component_rows
            .into_iter()
            .map(|r| ProductComponent {
                product_id: r.product_id,
                component_product_id: r.component_product_id,
                quantity_per_unit: r.quantity_per_unit,
            })
            .collect();

        Ok(CatalogGraph::build(products, components)?)
    }

    /// List all catalog products
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, product_type, cost, unit, min_stock, avg_purchase_quantity
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Get one product by id
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, product_type, cost, unit, min_stock, avg_purchase_quantity
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        row.into_product()
    }

    /// Get the direct recipe of a manufactured product
    pub async fn get_recipe(&self, product_id: Uuid) -> AppResult<Vec<RecipeLine>> {
        // Validate the product exists first for a clear 404
        self.get_product(product_id).await?;

        let lines = sqlx::query_as::<_, RecipeLine>(
            r#"
            SELECT pc.component_product_id, p.name as component_name,
                   p.product_type as component_type, pc.quantity_per_unit, p.unit
            FROM product_components pc
            JOIN products p ON p.id = pc.component_product_id
            WHERE pc.product_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(lines)
    }
}
