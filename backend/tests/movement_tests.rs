//! Daily movement ledger tests
//!
//! Tests for the day bucket arithmetic and day-control policies including:
//! - End-quantity invariant under arbitrary increment orderings
//! - Reason-to-bucket routing
//! - Start-quantity seeding and day-open idempotency
//! - Rejection of movements against a closed day, and of double closes

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

use chrono::{NaiveDate, Utc};
use shared::models::{opening_quantity, DailyMovementRecord};
use shared::types::MovementReason;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn open_record(start: Decimal) -> DailyMovementRecord {
    DailyMovementRecord::open(Uuid::new_v4(), day(), start)
}

/// Create a day record for every product that does not have one yet,
/// seeding the start quantity, the way the day-open statement does
fn open_day(
    records: &mut BTreeMap<Uuid, DailyMovementRecord>,
    products: &[(Uuid, Option<Decimal>, Option<Decimal>)],
) -> usize {
    let mut opened = 0;
    for &(product_id, prior_close, on_hand) in products {
        if !records.contains_key(&product_id) {
            let start = opening_quantity(prior_close, on_hand);
            records.insert(product_id, DailyMovementRecord::open(product_id, day(), start));
            opened += 1;
        }
    }
    opened
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// A day of mixed movements closes at
    /// start + incoming + return_sales - sales - return_waste
    #[test]
    fn test_mixed_day_closes_correctly() {
        let mut record = open_record(dec("100"));

        assert!(record.accumulate(MovementReason::Incoming, dec("40")));
        assert!(record.accumulate(MovementReason::SaleConsumption, dec("55")));
        assert!(record.accumulate(MovementReason::ReturnRestore, dec("3")));
        assert!(record.accumulate(MovementReason::Waste, dec("2")));

        // 100 + 40 + 3 - 55 - 2
        assert_eq!(record.expected_end_quantity(), dec("86"));

        assert!(record.close(Utc::now()));
        assert_eq!(record.end_quantity, Some(dec("86")));
    }

    /// Cancellation restores land in the return-sales bucket, keeping the
    /// invariant additive
    #[test]
    fn test_cancellation_is_additive() {
        let mut record = open_record(dec("10"));

        record.accumulate(MovementReason::SaleConsumption, dec("4"));
        record.accumulate(MovementReason::SaleCancellationRestore, dec("4"));

        assert_eq!(record.expected_end_quantity(), dec("10"));
    }

    /// Outgoing reasons are exactly sale consumption and waste
    #[test]
    fn test_reason_directions() {
        assert!(MovementReason::SaleConsumption.is_outgoing());
        assert!(MovementReason::Waste.is_outgoing());
        assert!(!MovementReason::SaleCancellationRestore.is_outgoing());
        assert!(!MovementReason::ReturnRestore.is_outgoing());
        assert!(!MovementReason::Incoming.is_outgoing());
    }

    /// Movements against a closed record are rejected and leave both the
    /// buckets and the persisted closing quantity untouched
    #[test]
    fn test_closed_day_rejects_movement() {
        let mut record = open_record(dec("30"));
        record.accumulate(MovementReason::SaleConsumption, dec("5"));
        assert!(record.close(Utc::now()));

        assert!(!record.accumulate(MovementReason::Incoming, dec("10")));
        assert!(!record.accumulate(MovementReason::SaleConsumption, dec("1")));

        assert_eq!(record.incoming_quantity, Decimal::ZERO);
        assert_eq!(record.sales_quantity, dec("5"));
        assert_eq!(record.end_quantity, Some(dec("25")));
    }

    /// Closing twice is rejected; the first close stands
    #[test]
    fn test_double_close_rejected() {
        let mut record = open_record(dec("12"));
        record.accumulate(MovementReason::Incoming, dec("8"));

        assert!(record.close(Utc::now()));
        let first_close = record.closed_at;
        assert_eq!(record.end_quantity, Some(dec("20")));

        assert!(!record.close(Utc::now()));
        assert_eq!(record.closed_at, first_close);
        assert_eq!(record.end_quantity, Some(dec("20")));
    }

    /// Start quantity seeds from the latest closed day first, then current
    /// on-hand, then zero
    #[test]
    fn test_opening_seed_precedence() {
        assert_eq!(opening_quantity(Some(dec("15")), Some(dec("9"))), dec("15"));
        assert_eq!(opening_quantity(None, Some(dec("9"))), dec("9"));
        assert_eq!(opening_quantity(None, None), Decimal::ZERO);
    }

    /// Opening the day twice creates no duplicate records and never
    /// re-seeds a record that already accumulated movements
    #[test]
    fn test_open_day_is_idempotent() {
        let carried = Uuid::new_v4();
        let fresh = Uuid::new_v4();
        let products = vec![
            (carried, Some(dec("50")), Some(dec("47"))),
            (fresh, None, None),
        ];

        let mut records = BTreeMap::new();
        assert_eq!(open_day(&mut records, &products), 2);
        assert_eq!(records[&carried].start_quantity, dec("50"));
        assert_eq!(records[&fresh].start_quantity, Decimal::ZERO);

        records
            .get_mut(&carried)
            .unwrap()
            .accumulate(MovementReason::SaleConsumption, dec("6"));

        // A second open is a no-op even though on-hand moved
        assert_eq!(open_day(&mut records, &products), 0);
        assert_eq!(records.len(), 2);
        assert_eq!(records[&carried].start_quantity, dec("50"));
        assert_eq!(records[&carried].sales_quantity, dec("6"));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

/// Quantities with two decimal places, 0.01 .. 100.00
fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1u32..10_000).prop_map(|n| Decimal::new(n as i64, 2))
}

fn reason_strategy() -> impl Strategy<Value = MovementReason> {
    prop_oneof![
        Just(MovementReason::SaleConsumption),
        Just(MovementReason::SaleCancellationRestore),
        Just(MovementReason::ReturnRestore),
        Just(MovementReason::Waste),
        Just(MovementReason::Incoming),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The closing quantity depends only on the multiset of movements, not
    /// on the order they arrived in
    #[test]
    fn prop_end_quantity_is_order_independent(
        start in quantity_strategy(),
        movements in prop::collection::vec((reason_strategy(), quantity_strategy()), 1..20),
    ) {
        let mut forward = open_record(start);
        for (reason, magnitude) in &movements {
            prop_assert!(forward.accumulate(*reason, *magnitude));
        }

        let mut backward = open_record(start);
        for (reason, magnitude) in movements.iter().rev() {
            prop_assert!(backward.accumulate(*reason, *magnitude));
        }

        prop_assert_eq!(
            forward.expected_end_quantity(),
            backward.expected_end_quantity()
        );
    }

    /// The closing quantity equals the signed sum computed independently
    /// from the movement sequence
    #[test]
    fn prop_end_quantity_matches_signed_sum(
        start in quantity_strategy(),
        movements in prop::collection::vec((reason_strategy(), quantity_strategy()), 0..20),
    ) {
        let mut record = open_record(start);
        let mut signed_sum = start;
        for (reason, magnitude) in &movements {
            record.accumulate(*reason, *magnitude);
            if reason.is_outgoing() {
                signed_sum -= *magnitude;
            } else {
                signed_sum += *magnitude;
            }
        }

        prop_assert_eq!(record.expected_end_quantity(), signed_sum);
    }

    /// Once closed, no movement sequence changes the record
    #[test]
    fn prop_closed_record_is_frozen(
        start in quantity_strategy(),
        movements in prop::collection::vec((reason_strategy(), quantity_strategy()), 1..10),
    ) {
        let mut record = open_record(start);
        record.accumulate(MovementReason::Incoming, start);
        prop_assert!(record.close(Utc::now()));
        let closed_end = record.end_quantity;

        for (reason, magnitude) in &movements {
            prop_assert!(!record.accumulate(*reason, *magnitude));
        }
        prop_assert_eq!(record.end_quantity, closed_end);
        prop_assert_eq!(record.expected_end_quantity(), start + start);
    }
}
