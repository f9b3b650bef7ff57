//! Business day bookkeeping for the stock ledger
//!
//! Per product per day the movement record moves NoRecord -> Open -> Closed.
//! Opening seeds `start_quantity` from the most recent closed day (else
//! current on-hand, else zero); closing computes the closing quantity from
//! the day's buckets and stamps `closed_at`. Day open/close are operator
//! actions; movements arriving without an open record auto-open one, see
//! the stock service.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Day open/close operations over the movement ledger
#[derive(Clone)]
pub struct BusinessDayService {
    db: PgPool,
}

/// Current state of today's stock bookkeeping
#[derive(Debug, Serialize)]
pub struct DayStatus {
    pub date: NaiveDate,
    /// Date of the open ledger day, or null when nothing is open
    pub open_date: Option<NaiveDate>,
    pub open_records: i64,
    pub closed_records: i64,
}

/// Result of an open/close operation
#[derive(Debug, Serialize)]
pub struct DayTransitionResult {
    pub date: NaiveDate,
    pub records_affected: u64,
}

impl BusinessDayService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Open today's ledger: create a movement record for every product that
    /// does not have one yet, seeding the start quantity.
    ///
    /// Idempotent: products already having a record for today are skipped,
    /// so a second call is a no-op rather than a duplicate or re-seed.
    pub async fn open_day(&self) -> AppResult<DayTransitionResult> {
        let today = Utc::now().date_naive();

        let result = sqlx::query(
            r#"
            INSERT INTO daily_movements (product_id, movement_date, start_quantity)
            SELECT p.id, $1,
                   COALESCE(
                       (SELECT dm.end_quantity FROM daily_movements dm
                        WHERE dm.product_id = p.id AND dm.movement_date < $1
                          AND dm.end_quantity IS NOT NULL
                        ORDER BY dm.movement_date DESC LIMIT 1),
                       (SELECT i.quantity FROM inventory_items i WHERE i.product_id = p.id),
                       0
                   )
            FROM products p
            WHERE NOT EXISTS (
                SELECT 1 FROM daily_movements d
                WHERE d.product_id = p.id AND d.movement_date = $1
            )
            "#,
        )
        .bind(today)
        .execute(&self.db)
        .await?;

        let records_affected = result.rows_affected();
        tracing::info!(date = %today, records = records_affected, "opened stock day");

        Ok(DayTransitionResult {
            date: today,
            records_affected,
        })
    }

    /// Close today's ledger: compute and persist the closing quantity for
    /// every open record (`start + incoming + return_sales - sales -
    /// return_waste`) and stamp `closed_at`.
    ///
    /// Closing with no open records, including closing twice, is an error.
    pub async fn close_day(&self) -> AppResult<DayTransitionResult> {
        let today = Utc::now().date_naive();

        let result = sqlx::query(
            r#"
            UPDATE daily_movements
            SET end_quantity = start_quantity + incoming_quantity + return_sales_quantity
                               - sales_quantity - return_waste_quantity,
                closed_at = NOW()
            WHERE movement_date = $1 AND closed_at IS NULL
            "#,
        )
        .bind(today)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidDayTransition(format!(
                "no open movement records for {}",
                today
            )));
        }

        let records_affected = result.rows_affected();
        tracing::info!(date = %today, records = records_affected, "closed stock day");

        Ok(DayTransitionResult {
            date: today,
            records_affected,
        })
    }

    /// Report whether today is open for stock bookkeeping
    pub async fn day_status(&self) -> AppResult<DayStatus> {
        let today = Utc::now().date_naive();

        let (open_records, closed_records): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE closed_at IS NULL) as open,
                   COUNT(*) FILTER (WHERE closed_at IS NOT NULL) as closed
            FROM daily_movements
            WHERE movement_date = $1
            "#,
        )
        .bind(today)
        .fetch_one(&self.db)
        .await?;

        Ok(DayStatus {
            date: today,
            open_date: (open_records > 0).then_some(today),
            open_records,
            closed_records,
        })
    }
}
