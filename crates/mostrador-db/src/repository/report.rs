//! # Report Repository
//!
//! Aggregated read-only queries for the dashboard and the reports screen.
//!
//! ## Query Inventory
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Dashboard                                                              │
//! │  ├── sales_total_today / sales_total_this_month                         │
//! │  ├── sales_by_day(7)          - bar chart series                        │
//! │  └── low_stock(10)            - alert panel with severity tiers         │
//! │                                                                         │
//! │  Reports                                                                │
//! │  ├── best_sellers(30d, 5)     - top products by units sold              │
//! │  ├── inventory_valuation      - Σ on-hand × average cost                │
//! │  ├── dormant_products(90d)    - no movement lines in the window         │
//! │  ├── movement_counts_by_type  - activity per movement type, 30d         │
//! │  └── product_traffic(30d)     - inbound vs outbound units per product   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Timestamps are stored as RFC 3339 text, so lexicographic comparison
//! against a bound chrono value is a correct time-window filter and
//! `substr(created_at, 1, 10)` is the calendar day.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::DbResult;
use mostrador_core::{Money, MovementDirection, StockAlert};

// =============================================================================
// Row Types
// =============================================================================

/// One entry in the best-sellers ranking.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BestSeller {
    pub product_id: i64,
    pub description: String,
    pub units_sold: i64,
}

/// Per-product line of the inventory valuation report.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ValuationLine {
    pub product_id: i64,
    pub description: String,
    pub quantity_on_hand: i64,
    pub average_cost_cents: i64,
    pub value_cents: i64,
}

/// The full valuation report: per-product lines plus the grand total.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryValuation {
    pub lines: Vec<ValuationLine>,
    pub total_cents: i64,
}

impl InventoryValuation {
    /// Grand total as Money.
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// An active product with no movement activity in the report window.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DormantProduct {
    pub product_id: i64,
    pub description: String,
    pub quantity_on_hand: i64,
    pub last_movement_at: Option<DateTime<Utc>>,
}

/// A product at or below its minimum-stock threshold.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LowStockProduct {
    pub product_id: i64,
    pub description: String,
    pub quantity_on_hand: i64,
    pub min_stock: i64,
}

impl LowStockProduct {
    /// Severity tier for the alert panel.
    pub fn alert(&self) -> Option<StockAlert> {
        StockAlert::classify(self.quantity_on_hand, self.min_stock)
    }
}

/// Movement-line activity aggregated per movement type.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MovementTypeActivity {
    pub movement_type_id: i64,
    pub description: String,
    pub direction: MovementDirection,
    pub movement_count: i64,
    pub total_units: i64,
}

/// Inbound vs outbound units for one product over the report window.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductTraffic {
    pub product_id: i64,
    pub description: String,
    pub inbound_units: i64,
    pub outbound_units: i64,
}

/// Sales total for one calendar day (UTC), for the dashboard series.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailySales {
    /// Day in `YYYY-MM-DD` form.
    pub day: String,
    pub total_cents: i64,
    pub invoice_count: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for aggregated reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Total of active invoices created today (UTC), in cents.
    pub async fn sales_total_today(&self) -> DbResult<i64> {
        let midnight = Utc::now()
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc();

        self.sales_total_since(midnight).await
    }

    /// Total of active invoices created this calendar month (UTC), in cents.
    pub async fn sales_total_this_month(&self) -> DbResult<i64> {
        let today = Utc::now().date_naive();
        let month_start = today
            .with_day(1)
            .unwrap_or(today)
            .and_time(NaiveTime::MIN)
            .and_utc();

        self.sales_total_since(month_start).await
    }

    async fn sales_total_since(&self, since: DateTime<Utc>) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_cents), 0)
            FROM invoices
            WHERE is_active = 1 AND created_at >= ?1
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Per-day sales totals for the last `days` days, oldest first. Days
    /// with no sales are absent from the result.
    pub async fn sales_by_day(&self, days: u32) -> DbResult<Vec<DailySales>> {
        let since = Utc::now() - Duration::days(i64::from(days));

        let rows: Vec<DailySales> = sqlx::query_as(
            r#"
            SELECT substr(created_at, 1, 10) AS day,
                   COALESCE(SUM(total_cents), 0) AS total_cents,
                   COUNT(*) AS invoice_count
            FROM invoices
            WHERE is_active = 1 AND created_at >= ?1
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Active products at or below their minimum-stock threshold, most
    /// critical first.
    pub async fn low_stock(&self, limit: u32) -> DbResult<Vec<LowStockProduct>> {
        let rows: Vec<LowStockProduct> = sqlx::query_as(
            r#"
            SELECT id AS product_id, description, quantity_on_hand, min_stock
            FROM products
            WHERE is_active = 1 AND quantity_on_hand <= min_stock
            ORDER BY quantity_on_hand, description
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // =========================================================================
    // Reports
    // =========================================================================

    /// Top products by units sold over the last `days` days.
    pub async fn best_sellers(&self, days: u32, limit: u32) -> DbResult<Vec<BestSeller>> {
        let since = Utc::now() - Duration::days(i64::from(days));

        let rows: Vec<BestSeller> = sqlx::query_as(
            r#"
            SELECT p.id AS product_id,
                   p.description,
                   SUM(il.quantity) AS units_sold
            FROM invoice_lines il
            JOIN invoices i ON i.id = il.invoice_id
            JOIN products p ON p.id = il.product_id
            WHERE i.is_active = 1 AND i.created_at >= ?1
            GROUP BY p.id, p.description
            ORDER BY units_sold DESC, p.description
            LIMIT ?2
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Values the active catalog at weighted-average cost.
    pub async fn inventory_valuation(&self) -> DbResult<InventoryValuation> {
        let lines: Vec<ValuationLine> = sqlx::query_as(
            r#"
            SELECT id AS product_id,
                   description,
                   quantity_on_hand,
                   average_cost_cents,
                   quantity_on_hand * average_cost_cents AS value_cents
            FROM products
            WHERE is_active = 1
            ORDER BY value_cents DESC, description
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let total_cents = lines.iter().map(|line| line.value_cents).sum();

        Ok(InventoryValuation { lines, total_cents })
    }

    /// Active products with no movement lines in the last `days` days,
    /// longest-idle first.
    pub async fn dormant_products(&self, days: u32, limit: u32) -> DbResult<Vec<DormantProduct>> {
        let since = Utc::now() - Duration::days(i64::from(days));

        let rows: Vec<DormantProduct> = sqlx::query_as(
            r#"
            SELECT p.id AS product_id,
                   p.description,
                   p.quantity_on_hand,
                   MAX(m.created_at) AS last_movement_at
            FROM products p
            LEFT JOIN movement_lines ml ON ml.product_id = p.id
            LEFT JOIN movements m ON m.id = ml.movement_id
            WHERE p.is_active = 1
            GROUP BY p.id, p.description, p.quantity_on_hand
            HAVING last_movement_at IS NULL OR last_movement_at < ?1
            ORDER BY last_movement_at, p.description
            LIMIT ?2
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Movement activity per type over the last `days` days.
    pub async fn movement_counts_by_type(&self, days: u32) -> DbResult<Vec<MovementTypeActivity>> {
        let since = Utc::now() - Duration::days(i64::from(days));

        let rows: Vec<MovementTypeActivity> = sqlx::query_as(
            r#"
            SELECT mt.id AS movement_type_id,
                   mt.description,
                   mt.direction,
                   COUNT(DISTINCT m.id) AS movement_count,
                   COALESCE(SUM(ml.quantity), 0) AS total_units
            FROM movement_types mt
            JOIN movements m ON m.movement_type_id = mt.id
            JOIN movement_lines ml ON ml.movement_id = m.id
            WHERE m.created_at >= ?1
            GROUP BY mt.id, mt.description, mt.direction
            ORDER BY total_units DESC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Inbound vs outbound units per product over the last `days` days.
    pub async fn product_traffic(&self, days: u32, limit: u32) -> DbResult<Vec<ProductTraffic>> {
        let since = Utc::now() - Duration::days(i64::from(days));

        let rows: Vec<ProductTraffic> = sqlx::query_as(
            r#"
            SELECT p.id AS product_id,
                   p.description,
                   COALESCE(SUM(CASE WHEN mt.direction = 'ENTRADA' THEN ml.quantity END), 0)
                       AS inbound_units,
                   COALESCE(SUM(CASE WHEN mt.direction = 'SALIDA' THEN ml.quantity END), 0)
                       AS outbound_units
            FROM products p
            JOIN movement_lines ml ON ml.product_id = p.id
            JOIN movements m ON m.id = ml.movement_id
            JOIN movement_types mt ON mt.id = m.movement_type_id
            WHERE m.created_at >= ?1
            GROUP BY p.id, p.description
            ORDER BY inbound_units + outbound_units DESC, p.description
            LIMIT ?2
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
