//! Daily stock movement models
//!
//! One record per product per business day, accumulating that day's
//! incoming, sales, return and waste quantities. The deviation report is
//! computed from these records.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::MovementReason;

/// Per-product, per-day movement ledger bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyMovementRecord {
    pub id: Uuid,
    pub product_id: Uuid,
    pub movement_date: NaiveDate,
    /// Carried from the prior day's closing quantity, or from on-hand for a
    /// product's first-ever record
    pub start_quantity: Decimal,
    pub incoming_quantity: Decimal,
    pub sales_quantity: Decimal,
    pub return_sales_quantity: Decimal,
    pub return_waste_quantity: Decimal,
    /// Computed when the day is closed
    pub end_quantity: Option<Decimal>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Start quantity for a newly opened day record: the most recent closed
/// day's closing quantity, else current on-hand, else zero
pub fn opening_quantity(prior_close: Option<Decimal>, on_hand: Option<Decimal>) -> Decimal {
    prior_close.or(on_hand).unwrap_or(Decimal::ZERO)
}

impl DailyMovementRecord {
    /// Fresh open record with empty buckets
    pub fn open(product_id: Uuid, movement_date: NaiveDate, start_quantity: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            movement_date,
            start_quantity,
            incoming_quantity: Decimal::ZERO,
            sales_quantity: Decimal::ZERO,
            return_sales_quantity: Decimal::ZERO,
            return_waste_quantity: Decimal::ZERO,
            end_quantity: None,
            closed_at: None,
        }
    }

    /// Closing quantity implied by the day's movements:
    /// `start + incoming + return_sales - sales - return_waste`
    pub fn expected_end_quantity(&self) -> Decimal {
        self.start_quantity + self.incoming_quantity + self.return_sales_quantity
            - self.sales_quantity
            - self.return_waste_quantity
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// Route a movement magnitude into its bucket
    ///
    /// Movements against a record that is already closed are rejected and
    /// leave the buckets untouched.
    pub fn accumulate(&mut self, reason: MovementReason, magnitude: Decimal) -> bool {
        if self.is_closed() {
            return false;
        }
        match MovementBucket::for_reason(reason) {
            MovementBucket::Incoming => self.incoming_quantity += magnitude,
            MovementBucket::Sales => self.sales_quantity += magnitude,
            MovementBucket::ReturnSales => self.return_sales_quantity += magnitude,
            MovementBucket::ReturnWaste => self.return_waste_quantity += magnitude,
        }
        true
    }

    /// Close the record, persisting the implied closing quantity
    ///
    /// Closing a record twice is rejected and leaves the first close
    /// untouched.
    pub fn close(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_closed() {
            return false;
        }
        self.end_quantity = Some(self.expected_end_quantity());
        self.closed_at = Some(at);
        true
    }
}

/// The daily bucket a movement reason accumulates into
///
/// All buckets accumulate absolute quantities; the sign convention lives in
/// [`DailyMovementRecord::expected_end_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementBucket {
    Incoming,
    Sales,
    ReturnSales,
    ReturnWaste,
}

impl MovementBucket {
    pub fn for_reason(reason: MovementReason) -> Self {
        match reason {
            MovementReason::SaleConsumption => MovementBucket::Sales,
            MovementReason::SaleCancellationRestore => MovementBucket::ReturnSales,
            MovementReason::ReturnRestore => MovementBucket::ReturnSales,
            MovementReason::Waste => MovementBucket::ReturnWaste,
            MovementReason::Incoming => MovementBucket::Incoming,
        }
    }

    /// Column of `daily_movements` this bucket accumulates into
    pub fn column(&self) -> &'static str {
        match self {
            MovementBucket::Incoming => "incoming_quantity",
            MovementBucket::Sales => "sales_quantity",
            MovementBucket::ReturnSales => "return_sales_quantity",
            MovementBucket::ReturnWaste => "return_waste_quantity",
        }
    }
}
