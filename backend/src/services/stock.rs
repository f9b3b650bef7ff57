//! Stock mutation service
//!
//! The only writer of the inventory ledger and the daily movement buckets.
//! Every mutation is an atomic upsert inside a transaction: the ledger row
//! and the day bucket for one event commit together or not at all, and
//! concurrent movements on the same product serialize on the row instead of
//! racing a load-then-save.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::availability::{evaluate_availability, insufficient_checks};
use shared::bom::RecipeExploder;
use shared::models::{MovementBucket, OrderLine, StockCheck, StockSnapshotLine, StockWarning};
use shared::types::MovementReason;
use shared::validation::{validate_order_lines, validate_positive_quantity};

use crate::config::StockConfig;
use crate::error::{AppError, AppResult};
use crate::services::catalog::CatalogService;

/// Stock mutation and availability service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
    policy: StockConfig,
}

/// Input carrying order lines (completion, returns, previews)
#[derive(Debug, Deserialize)]
pub struct OrderLinesInput {
    pub lines: Vec<OrderLine>,
}

/// Input for a single-product movement (incoming, waste)
#[derive(Debug, Deserialize)]
pub struct MovementInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
}

/// One consolidated requirement line with the product resolved
#[derive(Debug, Serialize)]
pub struct RequirementLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: Decimal,
}

/// Result of exploding an order and checking it against stock
#[derive(Debug, Serialize)]
pub struct AvailabilityResult {
    pub requirement: Vec<RequirementLine>,
    pub checks: Vec<StockCheck>,
    pub warnings: Vec<StockWarning>,
}

/// Result of a completion, cancellation or return
#[derive(Debug, Serialize)]
pub struct OrderStockResult {
    pub order_id: Uuid,
    /// Number of leaf products whose stock was mutated
    pub products_affected: usize,
    pub checks: Vec<StockCheck>,
    pub warnings: Vec<StockWarning>,
}

impl StockService {
    pub fn new(db: PgPool, policy: StockConfig) -> Self {
        Self { db, policy }
    }

    fn validation(field: &str, message: &str) -> AppError {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
            message_th: format!("ข้อมูลไม่ถูกต้อง: {}", message),
        }
    }

    /// Explode order lines into their consolidated leaf requirement
    pub async fn preview_requirement(&self, lines: &[OrderLine]) -> AppResult<AvailabilityResult> {
        validate_order_lines(lines).map_err(|msg| Self::validation("lines", msg))?;

        let graph = CatalogService::new(self.db.clone()).load_graph().await?;
        let exploded = RecipeExploder::new(&graph).explode(lines)?;

        let requirement = exploded
            .requirement()
            .iter()
            .map(|(&product_id, &quantity)| RequirementLine {
                product_id,
                product_name: graph.product_name(product_id),
                quantity,
            })
            .collect();

        Ok(AvailabilityResult {
            requirement,
            checks: Vec::new(),
            warnings: exploded.warnings().to_vec(),
        })
    }

    /// Explode order lines and check the requirement against on-hand stock
    pub async fn check_availability(&self, lines: &[OrderLine]) -> AppResult<AvailabilityResult> {
        validate_order_lines(lines).map_err(|msg| Self::validation("lines", msg))?;

        let graph = CatalogService::new(self.db.clone()).load_graph().await?;
        let exploded = RecipeExploder::new(&graph).explode(lines)?;
        let on_hand = self.on_hand_for(exploded.requirement().keys().copied().collect()).await?;
        let checks = evaluate_availability(&graph, exploded.requirement(), &on_hand);

        let requirement = exploded
            .requirement()
            .iter()
            .map(|(&product_id, &quantity)| RequirementLine {
                product_id,
                product_name: graph.product_name(product_id),
                quantity,
            })
            .collect();

        Ok(AvailabilityResult {
            requirement,
            checks,
            warnings: exploded.warnings().to_vec(),
        })
    }

    /// Order completion: explode, validate against policy, snapshot the leaf
    /// deltas and debit stock — all mutation in one transaction
    pub async fn complete_order(
        &self,
        order_id: Uuid,
        lines: &[OrderLine],
    ) -> AppResult<OrderStockResult> {
        validate_order_lines(lines).map_err(|msg| Self::validation("lines", msg))?;

        // A snapshot means the order's stock was already debited
        let already_completed = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM order_stock_snapshots WHERE order_id = $1)",
        )
        .bind(order_id)
        .fetch_one(&self.db)
        .await?;

        if already_completed {
            return Err(AppError::Conflict {
                resource: "order".to_string(),
                message: "Stock for this order was already consumed".to_string(),
                message_th: "สต็อกของออเดอร์นี้ถูกตัดไปแล้ว".to_string(),
            });
        }

        let graph = CatalogService::new(self.db.clone()).load_graph().await?;
        let exploded = RecipeExploder::new(&graph).explode(lines)?;
        let mut warnings = exploded.warnings().to_vec();
        self.log_anomalies(order_id, &warnings);

        let on_hand = self.on_hand_for(exploded.requirement().keys().copied().collect()).await?;
        let checks = evaluate_availability(&graph, exploded.requirement(), &on_hand);
        let shortfalls = insufficient_checks(&checks);

        if !shortfalls.is_empty() {
            if self.policy.block_on_insufficient {
                return Err(AppError::InsufficientStock { checks: shortfalls });
            }
            for check in &shortfalls {
                tracing::warn!(
                    order_id = %order_id,
                    product_id = %check.product_id,
                    product_name = %check.product_name,
                    required = %check.required,
                    available = %check.available,
                    "completing order with insufficient stock"
                );
                warnings.push(StockWarning::InsufficientStockAllowed {
                    product_id: check.product_id,
                    product_name: check.product_name.clone(),
                    required: check.required,
                    available: check.available,
                });
            }
        }

        // An order made up solely of direct raw-material lines debits
        // nothing and leaves no snapshot, so a later cancellation finds
        // nothing to restore and reports NotFound
        let consumed = exploded.consumption_quantities();

        let mut tx = self.db.begin().await?;
        for (&product_id, &quantity) in &consumed {
            // A concurrent double-completion races past the pool-side
            // check above; the snapshot primary key settles it here
            let inserted = sqlx::query(
                r#"
                INSERT INTO order_stock_snapshots (order_id, product_id, quantity)
                VALUES ($1, $2, $3)
                ON CONFLICT (order_id, product_id) DO NOTHING
                "#,
            )
            .bind(order_id)
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;

            if inserted.rows_affected() == 0 {
                return Err(AppError::Conflict {
                    resource: "order".to_string(),
                    message: "Stock for this order was already consumed".to_string(),
                    message_th: "สต็อกของออเดอร์นี้ถูกตัดไปแล้ว".to_string(),
                });
            }

            self.apply_delta_in(&mut tx, product_id, -quantity, MovementReason::SaleConsumption)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            products = consumed.len(),
            "order completion consumed stock"
        );

        Ok(OrderStockResult {
            order_id,
            products_affected: consumed.len(),
            checks,
            warnings,
        })
    }

    /// Order cancellation: restore exactly the quantities snapshotted at
    /// completion time, never a re-explosion of possibly-changed recipes
    pub async fn cancel_order(&self, order_id: Uuid) -> AppResult<OrderStockResult> {
        let mut tx = self.db.begin().await?;

        // Claim the snapshot atomically: the predicate stamps restored_at
        // and returns the lines in one statement, so a concurrent second
        // cancellation claims zero rows instead of crediting stock twice
        let snapshot = sqlx::query_as::<_, StockSnapshotRow>(
            r#"
            UPDATE order_stock_snapshots
            SET restored_at = NOW()
            WHERE order_id = $1 AND restored_at IS NULL
            RETURNING product_id, quantity
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        if snapshot.is_empty() {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM order_stock_snapshots WHERE order_id = $1)",
            )
            .bind(order_id)
            .fetch_one(&mut *tx)
            .await?;

            return Err(if exists {
                AppError::Conflict {
                    resource: "order".to_string(),
                    message: "Stock for this order was already restored".to_string(),
                    message_th: "สต็อกของออเดอร์นี้ถูกคืนไปแล้ว".to_string(),
                }
            } else {
                AppError::NotFound("Order stock snapshot".to_string())
            });
        }

        for line in &snapshot {
            self.apply_delta_in(
                &mut tx,
                line.product_id,
                line.quantity,
                MovementReason::SaleCancellationRestore,
            )
            .await?;
        }
        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            products = snapshot.len(),
            "order cancellation restored stock"
        );

        Ok(OrderStockResult {
            order_id,
            products_affected: snapshot.len(),
            checks: Vec::new(),
            warnings: Vec::new(),
        })
    }

    /// Return order: explode only the returned (product, quantity) pairs and
    /// credit their leaf quantities back
    pub async fn return_order(
        &self,
        order_id: Uuid,
        returned: &[OrderLine],
    ) -> AppResult<OrderStockResult> {
        validate_order_lines(returned).map_err(|msg| Self::validation("lines", msg))?;

        let graph = CatalogService::new(self.db.clone()).load_graph().await?;
        let exploded = RecipeExploder::new(&graph).explode(returned)?;
        let warnings = exploded.warnings().to_vec();
        self.log_anomalies(order_id, &warnings);

        // Mirror the consumption path: direct raw-material portions were
        // never debited, so they are not credited back either
        let restored = exploded.consumption_quantities();
        self.apply_deltas(&restored, MovementReason::ReturnRestore).await?;

        tracing::info!(
            order_id = %order_id,
            products = restored.len(),
            "return order restored stock"
        );

        Ok(OrderStockResult {
            order_id,
            products_affected: restored.len(),
            checks: Vec::new(),
            warnings,
        })
    }

    /// Leaf-level quantities consumed by a completed order, as persisted at
    /// completion time
    pub async fn get_snapshot(&self, order_id: Uuid) -> AppResult<Vec<StockSnapshotLine>> {
        let lines = sqlx::query_as::<_, SnapshotLineRow>(
            r#"
            SELECT order_id, product_id, quantity, created_at, restored_at
            FROM order_stock_snapshots
            WHERE order_id = $1
            ORDER BY product_id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        if lines.is_empty() {
            return Err(AppError::NotFound("Order stock snapshot".to_string()));
        }

        Ok(lines
            .into_iter()
            .map(|row| StockSnapshotLine {
                order_id: row.order_id,
                product_id: row.product_id,
                quantity: row.quantity,
                created_at: row.created_at,
                restored_at: row.restored_at,
            })
            .collect())
    }

    /// Record an incoming purchase/delivery
    pub async fn record_incoming(&self, input: &MovementInput) -> AppResult<()> {
        validate_positive_quantity(input.quantity)
            .map_err(|msg| Self::validation("quantity", msg))?;
        self.ensure_product_exists(input.product_id).await?;
        self.apply_delta(input.product_id, input.quantity, MovementReason::Incoming)
            .await
    }

    /// Record waste/spoilage
    pub async fn record_waste(&self, input: &MovementInput) -> AppResult<()> {
        validate_positive_quantity(input.quantity)
            .map_err(|msg| Self::validation("quantity", msg))?;
        self.ensure_product_exists(input.product_id).await?;
        self.apply_delta(input.product_id, -input.quantity, MovementReason::Waste)
            .await
    }

    /// Apply one signed delta in its own transaction
    pub async fn apply_delta(
        &self,
        product_id: Uuid,
        delta: Decimal,
        reason: MovementReason,
    ) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        self.apply_delta_in(&mut tx, product_id, delta, reason).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Apply a batch of signed deltas atomically (whole-order operations)
    pub async fn apply_deltas(
        &self,
        deltas: &BTreeMap<Uuid, Decimal>,
        reason: MovementReason,
    ) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        for (&product_id, &delta) in deltas {
            self.apply_delta_in(&mut tx, product_id, delta, reason).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// One ledger + day-bucket mutation inside the caller's transaction
    ///
    /// The day bucket is upserted first so its seed reads the on-hand
    /// quantity as of before this delta. A row for today is created on
    /// demand, seeded from the most recent closed day, else current
    /// on-hand, else zero. Movements against a product-day that is already
    /// closed are rejected.
    async fn apply_delta_in(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
        delta: Decimal,
        reason: MovementReason,
    ) -> AppResult<()> {
        let today = Utc::now().date_naive();
        let magnitude = delta.abs();
        let bucket = MovementBucket::for_reason(reason);

        // The bucket column comes from a fixed enum, never from input
        let bucket_sql = format!(
            r#"
            INSERT INTO daily_movements (product_id, movement_date, start_quantity, {col})
            VALUES (
                $1, $2,
                COALESCE(
                    (SELECT dm.end_quantity FROM daily_movements dm
                     WHERE dm.product_id = $1 AND dm.movement_date < $2
                       AND dm.end_quantity IS NOT NULL
                     ORDER BY dm.movement_date DESC LIMIT 1),
                    (SELECT i.quantity FROM inventory_items i WHERE i.product_id = $1),
                    0
                ),
                $3
            )
            ON CONFLICT (product_id, movement_date) DO UPDATE
            SET {col} = daily_movements.{col} + EXCLUDED.{col}
            WHERE daily_movements.closed_at IS NULL
            "#,
            col = bucket.column()
        );

        let bucket_result = sqlx::query(&bucket_sql)
            .bind(product_id)
            .bind(today)
            .bind(magnitude)
            .execute(&mut **tx)
            .await?;

        if bucket_result.rows_affected() == 0 {
            return Err(AppError::InvalidDayTransition(format!(
                "movement day {} is already closed for product {}",
                today, product_id
            )));
        }

        // Atomic increment on the ledger row, never load-then-save
        sqlx::query(
            r#"
            INSERT INTO inventory_items (product_id, quantity)
            VALUES ($1, $2)
            ON CONFLICT (product_id) DO UPDATE
            SET quantity = inventory_items.quantity + EXCLUDED.quantity,
                updated_at = NOW()
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .execute(&mut **tx)
        .await?;

        tracing::debug!(
            product_id = %product_id,
            delta = %delta,
            reason = reason.as_str(),
            "applied stock delta"
        );

        Ok(())
    }

    /// Current on-hand quantities for a set of products (missing rows = 0)
    async fn on_hand_for(&self, product_ids: Vec<Uuid>) -> AppResult<HashMap<Uuid, Decimal>> {
        let rows = sqlx::query_as::<_, (Uuid, Decimal)>(
            "SELECT product_id, quantity FROM inventory_items WHERE product_id = ANY($1)",
        )
        .bind(&product_ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn ensure_product_exists(&self, product_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Product".to_string()));
        }
        Ok(())
    }

    fn log_anomalies(&self, order_id: Uuid, warnings: &[StockWarning]) {
        for warning in warnings {
            if let StockWarning::DirectRawMaterialSale {
                product_id,
                product_name,
                quantity,
            } = warning
            {
                tracing::warn!(
                    order_id = %order_id,
                    product_id = %product_id,
                    product_name = %product_name,
                    quantity = %quantity,
                    "raw material sold directly as an order line"
                );
            }
        }
    }
}

/// Row returned by the cancellation claim
#[derive(Debug, sqlx::FromRow)]
struct StockSnapshotRow {
    product_id: Uuid,
    quantity: Decimal,
}

/// Row for full snapshot queries
#[derive(Debug, sqlx::FromRow)]
struct SnapshotLineRow {
    order_id: Uuid,
    product_id: Uuid,
    quantity: Decimal,
    created_at: chrono::DateTime<Utc>,
    restored_at: Option<chrono::DateTime<Utc>>,
}
