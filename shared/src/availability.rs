//! Stock availability evaluation
//!
//! Pure comparison of an exploded requirement against on-hand quantities.
//! The backend fetches on-hand levels and calls in here, so the decision
//! logic is testable without a database. Insufficiency is a reportable
//! condition, not an error; callers apply the blocking policy.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::catalog::CatalogGraph;
use crate::models::StockCheck;

/// Evaluate a requirement against on-hand stock
///
/// Products with no inventory row are treated as zero stock. Returns one
/// check per leaf product, sufficient entries included.
pub fn evaluate_availability(
    graph: &CatalogGraph,
    requirement: &BTreeMap<Uuid, Decimal>,
    on_hand: &HashMap<Uuid, Decimal>,
) -> Vec<StockCheck> {
    requirement
        .iter()
        .map(|(&product_id, &required)| {
            let available = on_hand.get(&product_id).copied().unwrap_or(Decimal::ZERO);
            StockCheck {
                product_id,
                product_name: graph.product_name(product_id),
                required,
                available,
                sufficient: available >= required,
            }
        })
        .collect()
}

/// Insufficient-only view, for warnings raised before order completion
pub fn insufficient_checks(checks: &[StockCheck]) -> Vec<StockCheck> {
    checks.iter().filter(|c| !c.sufficient).cloned().collect()
}
