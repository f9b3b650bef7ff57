//! Product catalog models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub product_type: ProductType,
    /// Per-unit cost, used for deviation cost impact
    pub cost: Decimal,
    /// Display unit (e.g. "kg", "pcs", "L")
    pub unit: String,
    /// Reorder threshold
    pub min_stock: Decimal,
    /// Typical purchase lot size, suggested when restocking
    pub avg_purchase_quantity: Decimal,
}

/// Classification of a product in the stock model
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Purchased ingredient, only ever consumed through a recipe
    RawMaterial,
    /// Stocked and sold as-is (bottled drinks, packaging)
    Consumable,
    /// Produced from a recipe of other products
    Manufactured,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::RawMaterial => "raw_material",
            ProductType::Consumable => "consumable",
            ProductType::Manufactured => "manufactured",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "raw_material" => Some(ProductType::RawMaterial),
            "consumable" => Some(ProductType::Consumable),
            "manufactured" => Some(ProductType::Manufactured),
            _ => None,
        }
    }

    /// Leaf products are never decomposed further during explosion
    pub fn is_leaf(&self) -> bool {
        !matches!(self, ProductType::Manufactured)
    }
}

/// One recipe edge: the parent consumes `quantity_per_unit` of the component
/// for each unit produced/sold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductComponent {
    pub product_id: Uuid,
    pub component_product_id: Uuid,
    pub quantity_per_unit: Decimal,
}
