//! Validation utilities for the Restaurant Stock Management Platform

use rust_decimal::Decimal;

use crate::models::OrderLine;
use crate::types::DateRange;

/// Validate a stock quantity is strictly positive
pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate order lines before they reach the explosion engine
///
/// The engine assumes positive quantities as a precondition; callers reject
/// bad input here first.
pub fn validate_order_lines(lines: &[OrderLine]) -> Result<(), &'static str> {
    if lines.is_empty() {
        return Err("Order must contain at least one line");
    }
    for line in lines {
        validate_positive_quantity(line.quantity)?;
    }
    Ok(())
}

/// Validate a report date range
pub fn validate_date_range(range: &DateRange) -> Result<(), &'static str> {
    if range.start > range.end {
        return Err("Start date must not be after end date");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn test_positive_quantity() {
        assert!(validate_positive_quantity(Decimal::ONE).is_ok());
        assert!(validate_positive_quantity(Decimal::ZERO).is_err());
        assert!(validate_positive_quantity(Decimal::NEGATIVE_ONE).is_err());
    }

    #[test]
    fn test_order_lines() {
        assert!(validate_order_lines(&[]).is_err());

        let good = OrderLine {
            product_id: Uuid::new_v4(),
            quantity: Decimal::from(2),
        };
        let bad = OrderLine {
            product_id: Uuid::new_v4(),
            quantity: Decimal::ZERO,
        };
        assert!(validate_order_lines(&[good.clone()]).is_ok());
        assert!(validate_order_lines(&[good, bad]).is_err());
    }

    #[test]
    fn test_date_range() {
        let d1 = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        assert!(validate_date_range(&DateRange { start: d1, end: d2 }).is_ok());
        assert!(validate_date_range(&DateRange { start: d2, end: d1 }).is_err());
    }
}
