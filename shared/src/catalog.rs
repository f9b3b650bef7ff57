//! In-memory product catalog and recipe graph
//!
//! The recipe graph is stored relationally but every explosion works over a
//! [`CatalogGraph`] built once per call: an adjacency map from product id to
//! its component edges, so the recursive walk never goes back to the
//! database.

use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Product, ProductComponent, ProductType};

/// Catalog configuration errors
///
/// These are fatal: a graph that fails to build, or a walk that detects a
/// cycle, aborts the whole triggering operation.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product {0} not found in catalog")]
    UnknownProduct(Uuid),

    #[error("recipe of '{product_name}' references unknown product {component_id}")]
    UnknownComponent {
        product_name: String,
        component_id: Uuid,
    },

    #[error("manufactured product '{0}' has no recipe components")]
    EmptyRecipe(String),

    #[error("recipe of '{product_name}' has non-positive quantity {quantity} for component '{component_name}'")]
    NonPositiveComponentQuantity {
        product_name: String,
        component_name: String,
        quantity: Decimal,
    },

    #[error("recipe cycle detected: {0}")]
    RecipeCycle(String),
}

/// Product catalog with recipe adjacency, validated on construction
#[derive(Debug, Clone)]
pub struct CatalogGraph {
    products: HashMap<Uuid, Product>,
    components: HashMap<Uuid, Vec<ProductComponent>>,
}

impl CatalogGraph {
    /// Build the graph and validate its static invariants: every component
    /// edge resolves to a known product, component multipliers are positive,
    /// and every manufactured product has at least one component.
    ///
    /// Cycles are caught during the walk itself, where the offending path is
    /// known, see [`crate::bom::RecipeExploder`].
    pub fn build(
        products: Vec<Product>,
        components: Vec<ProductComponent>,
    ) -> Result<Self, CatalogError> {
        let products: HashMap<Uuid, Product> =
            products.into_iter().map(|p| (p.id, p)).collect();

        let mut adjacency: HashMap<Uuid, Vec<ProductComponent>> = HashMap::new();
        for edge in components {
            let parent = products
                .get(&edge.product_id)
                .ok_or(CatalogError::UnknownProduct(edge.product_id))?;

            let component = products.get(&edge.component_product_id).ok_or_else(|| {
                CatalogError::UnknownComponent {
                    product_name: parent.name.clone(),
                    component_id: edge.component_product_id,
                }
            })?;

            if edge.quantity_per_unit <= Decimal::ZERO {
                return Err(CatalogError::NonPositiveComponentQuantity {
                    product_name: parent.name.clone(),
                    component_name: component.name.clone(),
                    quantity: edge.quantity_per_unit,
                });
            }

            adjacency.entry(edge.product_id).or_default().push(edge);
        }

        for product in products.values() {
            if product.product_type == ProductType::Manufactured
                && !adjacency.contains_key(&product.id)
            {
                return Err(CatalogError::EmptyRecipe(product.name.clone()));
            }
        }

        Ok(Self {
            products,
            components: adjacency,
        })
    }

    pub fn product(&self, id: Uuid) -> Result<&Product, CatalogError> {
        self.products.get(&id).ok_or(CatalogError::UnknownProduct(id))
    }

    /// Component edges of a product; empty for leaf products
    pub fn components_of(&self, id: Uuid) -> &[ProductComponent] {
        self.components.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Display name, falling back to the raw id for unknown products
    pub fn product_name(&self, id: Uuid) -> String {
        self.products
            .get(&id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
