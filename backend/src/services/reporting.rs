//! Reporting service over the stock ledger
//! Provides the deviation (ideal vs actual remaining) and low-stock reports

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::types::DateRange;
use shared::validation::validate_date_range;

use crate::error::{AppError, AppResult};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Aggregated movement row for one product over a date range
#[derive(Debug, FromRow)]
struct MovementSumRow {
    product_id: Uuid,
    product_name: String,
    unit: String,
    cost: Decimal,
    start_quantity: Decimal,
    incoming_quantity: Decimal,
    sales_quantity: Decimal,
    return_sales_quantity: Decimal,
    return_waste_quantity: Decimal,
    actual_remaining: Decimal,
}

/// One deviation report entry
///
/// `ideal_remaining` is what the ledger says should be left; `deviation` is
/// live on-hand minus that, so shrinkage shows up negative.
#[derive(Debug, Serialize)]
pub struct DeviationEntry {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit: String,
    pub start_quantity: Decimal,
    pub incoming_quantity: Decimal,
    pub sales_quantity: Decimal,
    pub return_sales_quantity: Decimal,
    pub return_waste_quantity: Decimal,
    pub ideal_remaining: Decimal,
    pub actual_remaining: Decimal,
    pub deviation: Decimal,
    pub cost_impact: Decimal,
}

impl DeviationEntry {
    /// Pure deviation arithmetic:
    /// `ideal = (start + incoming) - (sales + return_waste)`,
    /// `deviation = actual - ideal`, `cost_impact = |deviation| * unit cost`
    fn compute(
        start: Decimal,
        incoming: Decimal,
        sales: Decimal,
        return_waste: Decimal,
        actual: Decimal,
        unit_cost: Decimal,
    ) -> (Decimal, Decimal, Decimal) {
        let ideal = (start + incoming) - (sales + return_waste);
        let deviation = actual - ideal;
        let cost_impact = deviation.abs() * unit_cost;
        (ideal, deviation, cost_impact)
    }
}

/// One low-stock report entry
#[derive(Debug, Serialize, FromRow)]
pub struct LowStockEntry {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit: String,
    pub on_hand: Decimal,
    pub min_stock: Decimal,
    /// Typical purchase lot size, suggested as the reorder amount
    pub suggested_order: Decimal,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Deviation report across a date range
    ///
    /// Includes open records, so "as of now" queries work mid-day. Products
    /// with no movement rows in the range are omitted: no ledger, no ideal
    /// to deviate from.
    pub async fn get_deviation_report(
        &self,
        range: &DateRange,
    ) -> AppResult<Vec<DeviationEntry>> {
        validate_date_range(range).map_err(|msg| AppError::Validation {
            field: "date_range".to_string(),
            message: msg.to_string(),
            message_th: format!("ข้อมูลไม่ถูกต้อง: {}", msg),
        })?;

        let rows = sqlx::query_as::<_, MovementSumRow>(
            r#"
            SELECT p.id as product_id, p.name as product_name, p.unit, p.cost,
                   COALESCE(
                       (SELECT dm2.start_quantity FROM daily_movements dm2
                        WHERE dm2.product_id = p.id
                          AND dm2.movement_date BETWEEN $1 AND $2
                        ORDER BY dm2.movement_date ASC LIMIT 1),
                       0
                   ) as start_quantity,
                   COALESCE(SUM(dm.incoming_quantity), 0) as incoming_quantity,
                   COALESCE(SUM(dm.sales_quantity), 0) as sales_quantity,
                   COALESCE(SUM(dm.return_sales_quantity), 0) as return_sales_quantity,
                   COALESCE(SUM(dm.return_waste_quantity), 0) as return_waste_quantity,
                   COALESCE(i.quantity, 0) as actual_remaining
            FROM products p
            JOIN daily_movements dm ON dm.product_id = p.id
                AND dm.movement_date BETWEEN $1 AND $2
            LEFT JOIN inventory_items i ON i.product_id = p.id
            GROUP BY p.id, p.name, p.unit, p.cost, i.quantity
            ORDER BY p.name
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let (ideal_remaining, deviation, cost_impact) = DeviationEntry::compute(
                    r.start_quantity,
                    r.incoming_quantity,
                    r.sales_quantity,
                    r.return_waste_quantity,
                    r.actual_remaining,
                    r.cost,
                );
                DeviationEntry {
                    product_id: r.product_id,
                    product_name: r.product_name,
                    unit: r.unit,
                    start_quantity: r.start_quantity,
                    incoming_quantity: r.incoming_quantity,
                    sales_quantity: r.sales_quantity,
                    return_sales_quantity: r.return_sales_quantity,
                    return_waste_quantity: r.return_waste_quantity,
                    ideal_remaining,
                    actual_remaining: r.actual_remaining,
                    deviation,
                    cost_impact,
                }
            })
            .collect())
    }

    /// Products at or below their reorder threshold
    ///
    /// Manufactured products are excluded: their stock exists only as the
    /// leaves of their recipes.
    pub async fn get_low_stock_report(&self) -> AppResult<Vec<LowStockEntry>> {
        let entries = sqlx::query_as::<_, LowStockEntry>(
            r#"
            SELECT p.id as product_id, p.name as product_name, p.unit,
                   COALESCE(i.quantity, 0) as on_hand,
                   p.min_stock,
                   p.avg_purchase_quantity as suggested_order
            FROM products p
            LEFT JOIN inventory_items i ON i.product_id = p.id
            WHERE p.product_type != 'manufactured'
              AND COALESCE(i.quantity, 0) <= p.min_stock
            ORDER BY p.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record).map_err(|e| {
                crate::error::AppError::Internal(format!("CSV serialization error: {}", e))
            })?;
        }
        let csv_data = String::from_utf8(wtr.into_inner().map_err(|e| {
            crate::error::AppError::Internal(format!("CSV writer error: {}", e))
        })?)
        .map_err(|e| crate::error::AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_deviation_shrinkage_is_negative() {
        // Ledger says 100 + 50 - 40 - 5 = 105 should remain; 100 counted
        let (ideal, deviation, cost_impact) = DeviationEntry::compute(
            dec("100"),
            dec("50"),
            dec("40"),
            dec("5"),
            dec("100"),
            dec("2.5"),
        );
        assert_eq!(ideal, dec("105"));
        assert_eq!(deviation, dec("-5"));
        assert_eq!(cost_impact, dec("12.5"));
    }

    #[test]
    fn test_deviation_zero_when_ledger_matches() {
        let (ideal, deviation, cost_impact) =
            DeviationEntry::compute(dec("20"), dec("0"), dec("8"), dec("2"), dec("10"), dec("7"));
        assert_eq!(ideal, dec("10"));
        assert_eq!(deviation, Decimal::ZERO);
        assert_eq!(cost_impact, Decimal::ZERO);
    }
}
