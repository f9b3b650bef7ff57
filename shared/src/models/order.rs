//! Order-facing stock models
//!
//! The order subsystem itself (status transitions, payment) lives outside
//! this platform; these are the shapes it exchanges with the stock engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One order line as submitted by the order subsystem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: Decimal,
}

/// One persisted leaf-level delta from an order completion
///
/// Written at completion time and reused verbatim for cancellation, so
/// restoration matches what was actually consumed even if recipes changed
/// in between. A snapshot can be restored at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSnapshotLine {
    pub order_id: Uuid,
    pub product_id: Uuid,
    /// Quantity debited from stock at completion (positive number)
    pub quantity: Decimal,
    pub created_at: DateTime<Utc>,
    pub restored_at: Option<DateTime<Utc>>,
}

impl StockSnapshotLine {
    /// Claim the line for restoration, stamping `restored_at`
    ///
    /// A line can be claimed at most once; a second claim is rejected and
    /// must not credit stock again.
    pub fn claim_restore(&mut self, at: DateTime<Utc>) -> bool {
        if self.restored_at.is_some() {
            return false;
        }
        self.restored_at = Some(at);
        true
    }
}

/// Structured warning attached to a stock operation result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StockWarning {
    /// A raw material was sold directly as an order line; it is validated
    /// but its stock is not mutated through the sale path
    DirectRawMaterialSale {
        product_id: Uuid,
        product_name: String,
        quantity: Decimal,
    },
    /// A shortfall that was allowed through by the insufficiency policy
    InsufficientStockAllowed {
        product_id: Uuid,
        product_name: String,
        required: Decimal,
        available: Decimal,
    },
}
