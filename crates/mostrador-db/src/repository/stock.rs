//! # Warehouse Stock Ledger
//!
//! Per-(product, warehouse) quantity-on-hand rows, plus the single shared
//! stock lookup used by every validation path.
//!
//! ## Single Source of Truth
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Check Paths                                    │
//! │                                                                         │
//! │  Sale engine pre-check ──────────┐                                     │
//! │                                  ├──► stock_on_hand(executor, p, w)    │
//! │  Outbound engine pre-check ──────┘         │                           │
//! │                                            ▼                           │
//! │                               SELECT quantity FROM warehouse_stock     │
//! │                               missing row → 0, never an error          │
//! │                                                                         │
//! │  One function, one semantics: the two validation paths can never       │
//! │  drift apart.                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The free functions take a generic [`SqliteExecutor`] so the same code
//! serves pool-level reads and in-transaction checks from the engines.

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use mostrador_core::WarehouseStockRow;

// =============================================================================
// Executor-Generic Ledger Operations
// =============================================================================

/// Returns quantity-on-hand for a (product, warehouse) pair.
///
/// Defaults to 0 when no ledger row exists - a product that never moved
/// into a warehouse simply has nothing there, which is not an error.
pub async fn stock_on_hand<'e, E>(
    executor: E,
    product_id: i64,
    warehouse_id: i64,
) -> DbResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let quantity: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT quantity
        FROM warehouse_stock
        WHERE product_id = ?1 AND warehouse_id = ?2
        "#,
    )
    .bind(product_id)
    .bind(warehouse_id)
    .fetch_optional(executor)
    .await?;

    Ok(quantity.unwrap_or(0))
}

/// Adjusts a warehouse ledger row by a delta, creating the row lazily.
///
/// ## Delta Pattern
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  ❌ WRONG: absolute update (races with a concurrent writer)            │
/// │     UPDATE warehouse_stock SET quantity = 7                             │
/// │                                                                         │
/// │  ✅ CORRECT: delta upsert                                               │
/// │     INSERT ... ON CONFLICT DO UPDATE SET quantity = quantity + delta    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// A negative delta against a missing row inserts a negative quantity:
/// the ledger is allowed to go negative when bookkeeping is behind the
/// physical shelf. Oversell protection lives in the engines' pre-checks,
/// not here.
pub async fn adjust_stock<'e, E>(
    executor: E,
    product_id: i64,
    warehouse_id: i64,
    delta: i64,
) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(product_id, warehouse_id, delta, "Adjusting warehouse stock");

    sqlx::query(
        r#"
        INSERT INTO warehouse_stock (product_id, warehouse_id, quantity)
        VALUES (?1, ?2, ?3)
        ON CONFLICT (product_id, warehouse_id)
        DO UPDATE SET quantity = quantity + excluded.quantity
        "#,
    )
    .bind(product_id)
    .bind(warehouse_id)
    .bind(delta)
    .execute(executor)
    .await?;

    Ok(())
}

/// Sums a product's ledger rows across all warehouses.
///
/// Used to verify the denormalized `products.quantity_on_hand` stays in
/// lockstep with the ledger.
pub async fn ledger_total<'e, E>(executor: E, product_id: i64) -> DbResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let total: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT SUM(quantity)
        FROM warehouse_stock
        WHERE product_id = ?1
        "#,
    )
    .bind(product_id)
    .fetch_one(executor)
    .await?;

    Ok(total.unwrap_or(0))
}

// =============================================================================
// Repository
// =============================================================================

/// Pool-level access to the warehouse stock ledger.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Quantity-on-hand for a (product, warehouse) pair; 0 when no row.
    pub async fn lookup(&self, product_id: i64, warehouse_id: i64) -> DbResult<i64> {
        stock_on_hand(&self.pool, product_id, warehouse_id).await
    }

    /// All ledger rows for a product, ordered by warehouse.
    pub async fn rows_for_product(&self, product_id: i64) -> DbResult<Vec<WarehouseStockRow>> {
        let rows: Vec<WarehouseStockRow> = sqlx::query_as(
            r#"
            SELECT product_id, warehouse_id, quantity
            FROM warehouse_stock
            WHERE product_id = ?1
            ORDER BY warehouse_id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// All ledger rows in a warehouse, ordered by product.
    pub async fn rows_for_warehouse(&self, warehouse_id: i64) -> DbResult<Vec<WarehouseStockRow>> {
        let rows: Vec<WarehouseStockRow> = sqlx::query_as(
            r#"
            SELECT product_id, warehouse_id, quantity
            FROM warehouse_stock
            WHERE warehouse_id = ?1
            ORDER BY product_id
            "#,
        )
        .bind(warehouse_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Sum of a product's ledger rows across all warehouses.
    pub async fn total_for_product(&self, product_id: i64) -> DbResult<i64> {
        ledger_total(&self.pool, product_id).await
    }
}
