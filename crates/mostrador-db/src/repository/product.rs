//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - CRUD with soft delete (history keeps referencing inactive products)
//! - Description search with optional category filter
//! - In-transaction stock/cost updates used by the engines
//!
//! ## Dual Stock Bookkeeping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products.quantity_on_hand   =   Σ warehouse_stock.quantity             │
//! │        (denormalized)                  (the ledger)                     │
//! │                                                                         │
//! │  Both are updated in lockstep inside every engine transaction.          │
//! │  The engines own that invariant; this repository only provides the     │
//! │  primitives.                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use mostrador_core::{Product, DEFAULT_MIN_STOCK};

// =============================================================================
// Inputs
// =============================================================================

/// Fields required to create a product. The id comes back from the insert.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub description: String,
    pub unit_id: i64,
    pub category_id: i64,
    pub sale_price_cents: i64,
    pub average_cost_cents: i64,
    pub min_stock: i64,
    /// User creating the product - explicit identity, never ambient.
    pub created_by: i64,
}

impl NewProduct {
    /// Convenience constructor with the default minimum-stock threshold.
    pub fn new(
        description: impl Into<String>,
        unit_id: i64,
        category_id: i64,
        sale_price_cents: i64,
        created_by: i64,
    ) -> Self {
        NewProduct {
            description: description.into(),
            unit_id,
            category_id,
            sale_price_cents,
            average_cost_cents: 0,
            min_stock: DEFAULT_MIN_STOCK,
            created_by,
        }
    }
}

// =============================================================================
// Executor-Generic State Access (used inside engine transactions)
// =============================================================================

/// The slice of product state the engines read per line: the pre-update
/// quantity and cost, plus the description for shortage reports.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductStockState {
    pub description: String,
    pub quantity_on_hand: i64,
    pub average_cost_cents: i64,
}

/// Reads a product's current stock state, inside or outside a transaction.
pub async fn stock_state<'e, E>(
    executor: E,
    product_id: i64,
) -> DbResult<Option<ProductStockState>>
where
    E: SqliteExecutor<'e>,
{
    let state: Option<ProductStockState> = sqlx::query_as(
        r#"
        SELECT description, quantity_on_hand, average_cost_cents
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(product_id)
    .fetch_optional(executor)
    .await?;

    Ok(state)
}

/// Applies a quantity delta to the denormalized product total.
///
/// Negative for sales and outbound movements, positive for inbound.
pub async fn apply_quantity_delta<'e, E>(
    executor: E,
    product_id: i64,
    delta: i64,
) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(product_id, delta, "Applying product quantity delta");

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE products
        SET quantity_on_hand = quantity_on_hand + ?2,
            updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(product_id)
    .bind(delta)
    .bind(now)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", product_id));
    }

    Ok(())
}

/// Applies one inbound line to a product: adds the quantity and stores the
/// freshly recomputed weighted-average cost in the same statement.
pub async fn apply_inbound_line<'e, E>(
    executor: E,
    product_id: i64,
    quantity: i64,
    new_average_cost_cents: i64,
) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(
        product_id,
        quantity, new_average_cost_cents, "Applying inbound line to product"
    );

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE products
        SET quantity_on_hand = quantity_on_hand + ?2,
            average_cost_cents = ?3,
            updated_at = ?4
        WHERE id = ?1
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(new_average_cost_cents)
    .bind(now)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", product_id));
    }

    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str = r#"
    id, description, unit_id, category_id,
    sale_price_cents, average_cost_cents,
    quantity_on_hand, min_stock, is_active,
    created_by, created_at, updated_at
"#;

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product and returns its generated id.
    pub async fn insert(&self, new: &NewProduct) -> DbResult<i64> {
        debug!(description = %new.description, "Inserting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                description, unit_id, category_id,
                sale_price_cents, average_cost_cents,
                quantity_on_hand, min_stock, is_active,
                created_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, 1, ?7, ?8, ?8)
            "#,
        )
        .bind(&new.description)
        .bind(new.unit_id)
        .bind(new.category_id)
        .bind(new.sale_price_cents)
        .bind(new.average_cost_cents)
        .bind(new.min_stock)
        .bind(new.created_by)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Gets a product by its ID (active or not - history needs both).
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product: Option<Product> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products ordered by description.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products: Vec<Product> = sqlx::query_as(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE is_active = 1
            ORDER BY description
            LIMIT ?1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists active products with stock on hand - what the POS screen
    /// offers for sale.
    pub async fn list_sellable(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products: Vec<Product> = sqlx::query_as(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE is_active = 1 AND quantity_on_hand > 0
            ORDER BY description
            LIMIT ?1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Searches active products by description, optionally narrowed to a
    /// category.
    ///
    /// ## Arguments
    /// * `query` - Search term matched as a LIKE infix (can be empty)
    /// * `category_id` - Optional category filter
    /// * `limit` - Maximum results to return
    pub async fn search(
        &self,
        query: &str,
        category_id: Option<i64>,
        limit: u32,
    ) -> DbResult<Vec<Product>> {
        let query = query.trim();
        debug!(query = %query, ?category_id, limit, "Searching products");

        let pattern = format!("%{query}%");

        let products: Vec<Product> = sqlx::query_as(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE is_active = 1
              AND description LIKE ?1
              AND (?2 IS NULL OR category_id = ?2)
            ORDER BY description
            LIMIT ?3
            "#
        ))
        .bind(pattern)
        .bind(category_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Updates a product's catalog fields.
    ///
    /// Quantity-on-hand and average cost are NOT touched here; those move
    /// only through the engines' transactions.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET description = ?2,
                unit_id = ?3,
                category_id = ?4,
                sale_price_cents = ?5,
                min_stock = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(product.id)
        .bind(&product.description)
        .bind(product.unit_id)
        .bind(product.category_id)
        .bind(product.sale_price_cents)
        .bind(product.min_stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product.id));
        }

        Ok(())
    }

    /// Soft-deletes a product by setting is_active = 0.
    ///
    /// ## Why Soft Delete?
    /// - Historical invoices and movements still reference the product
    /// - Can be restored if removed by mistake
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET is_active = 0,
                updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics and the dashboard).
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
