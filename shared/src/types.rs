//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Reason a stock quantity was changed
///
/// The reason decides which bucket of the day's movement record receives the
/// quantity, see [`crate::models::MovementBucket`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MovementReason {
    /// Leaf consumption from a completed order (negative delta)
    SaleConsumption,
    /// Restoration from cancelling a previously completed order (positive)
    SaleCancellationRestore,
    /// Restoration from a partial or full return order (positive)
    ReturnRestore,
    /// Recorded waste or spoilage (negative)
    Waste,
    /// Incoming purchase/delivery or manual upward adjustment (positive)
    Incoming,
}

impl MovementReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementReason::SaleConsumption => "sale_consumption",
            MovementReason::SaleCancellationRestore => "sale_cancellation_restore",
            MovementReason::ReturnRestore => "return_restore",
            MovementReason::Waste => "waste",
            MovementReason::Incoming => "incoming",
        }
    }

    /// Whether deltas carrying this reason are expected to be negative
    pub fn is_outgoing(&self) -> bool {
        matches!(
            self,
            MovementReason::SaleConsumption | MovementReason::Waste
        )
    }
}

/// Date range for queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}
