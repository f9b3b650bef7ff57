//! Inventory ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current on-hand quantity for a product
///
/// A product with no row is treated as zero stock. Rows are mutated only by
/// the stock mutation service, never directly by order or UI code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryLevel {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// Availability check result for one leaf product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCheck {
    pub product_id: Uuid,
    pub product_name: String,
    pub required: Decimal,
    pub available: Decimal,
    pub sufficient: bool,
}

impl StockCheck {
    /// Shortfall amount, zero when sufficient
    pub fn shortfall(&self) -> Decimal {
        if self.sufficient {
            Decimal::ZERO
        } else {
            self.required - self.available
        }
    }
}
