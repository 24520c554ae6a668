//! # Domain Types
//!
//! Core domain types used throughout Mostrador POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Movement     │   │    Invoice      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  sale_price     │   │  movement_type  │   │  total_cents    │       │
//! │  │  average_cost   │   │  warehouse_id   │   │  tendered/change│       │
//! │  │  qty_on_hand    │   │  lines[]        │   │  lines[]        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────────┐   ┌─────────────────┐   ┌─────────────┐       │
//! │  │ MovementDirection   │   │      Role       │   │ StockAlert  │       │
//! │  │  ─────────────────  │   │  ─────────────  │   │ ─────────── │       │
//! │  │  Entrada (stock in) │   │  Administrator  │   │  Critical   │       │
//! │  │  Salida (stock out) │   │  Cashier        │   │  VeryLow    │       │
//! │  └─────────────────────┘   └─────────────────┘   │  Low        │       │
//! │                                                  └─────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Direction and role used to be loose string/int tags; here they are closed
//! enumerations with exhaustive matching, so a typo'd tag cannot silently
//! match nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Movement Direction
// =============================================================================

/// Whether a movement type increases or decreases warehouse stock.
///
/// Stored as `'ENTRADA'` / `'SALIDA'` text in the database, matching the
/// catalog the movement engine validates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementDirection {
    /// Stock enters a warehouse (purchases, returns in).
    Entrada,
    /// Stock leaves a warehouse (sales, adjustments out).
    Salida,
}

impl fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementDirection::Entrada => write!(f, "ENTRADA"),
            MovementDirection::Salida => write!(f, "SALIDA"),
        }
    }
}

// =============================================================================
// Role
// =============================================================================

/// User role. Stored as its integer discriminant (1 = administrator,
/// 2 = cashier), preserving the ids the user table has always carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator = 1,
    Cashier = 2,
}

impl Role {
    /// Administrators can do everything a cashier can.
    #[inline]
    pub const fn can_manage_catalog(&self) -> bool {
        matches!(self, Role::Administrator)
    }
}

// =============================================================================
// Catalog Entities
// =============================================================================

/// A product available for sale and stocking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,

    /// Display description shown to the cashier and on reports.
    pub description: String,

    /// Unit-of-measure reference.
    pub unit_id: i64,

    /// Category reference.
    pub category_id: i64,

    /// Sale price in cents.
    pub sale_price_cents: i64,

    /// Running weighted-average cost in cents.
    /// Recomputed on every stock-in line, untouched by stock-out.
    pub average_cost_cents: i64,

    /// Denormalized total quantity-on-hand across all warehouses.
    /// Kept in lockstep with the warehouse ledger rows inside every
    /// mutating transaction.
    pub quantity_on_hand: i64,

    /// Minimum-stock threshold for low-stock alerts.
    pub min_stock: i64,

    /// Whether the product is active (soft delete).
    pub is_active: bool,

    /// User who created the product.
    pub created_by: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as a Money type.
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    /// Returns the weighted-average cost as a Money type.
    #[inline]
    pub fn average_cost(&self) -> Money {
        Money::from_cents(self.average_cost_cents)
    }

    /// Checks whether quantity-on-hand is at or below the minimum threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity_on_hand <= self.min_stock
    }
}

/// A product category. Hard-deleted reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub description: String,
}

/// A unit of measure. Hard-deleted reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Unit {
    pub id: i64,
    pub description: String,
    pub abbreviation: String,
}

/// A supplier of inbound stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub tax_id: String,
}

/// A physical warehouse holding stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Warehouse {
    pub id: i64,
    pub name: String,
}

/// A payment method (cash, card, ...). Reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
}

/// A movement type from the catalog, tagged with its direction.
/// Static reference data driving validation in the movement engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MovementType {
    pub id: i64,
    pub description: String,
    pub direction: MovementDirection,
    /// Display letter shown in movement history (C, V, A, ...).
    pub letter: String,
}

/// A system user. Identity is passed into every engine operation as a
/// parameter, never read from ambient session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
}

// =============================================================================
// Warehouse Ledger
// =============================================================================

/// One row of the warehouse ledger: quantity-on-hand for a
/// (product, warehouse) pair. Created lazily on first movement in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct WarehouseStockRow {
    pub product_id: i64,
    pub warehouse_id: i64,
    pub quantity: i64,
}

// =============================================================================
// Movements (append-only)
// =============================================================================

/// A recorded event of stock entering or leaving a warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Movement {
    pub id: i64,
    pub movement_type_id: i64,
    /// Supplier for inbound purchases; None for outbound and sales.
    pub supplier_id: Option<i64>,
    /// Supplier invoice number, when one exists.
    pub invoice_number: Option<String>,
    pub warehouse_id: i64,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// A line item on a movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MovementLine {
    pub id: i64,
    pub movement_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_cost_cents: i64,
    pub total_cost_cents: i64,
}

// =============================================================================
// Invoices (append-only)
// =============================================================================

/// A sale invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: i64,
    pub total_cents: i64,
    pub tendered_cents: i64,
    pub change_cents: i64,
    pub payment_method_id: i64,
    pub note: String,
    pub cashier_id: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Returns the invoice total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item on an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceLine {
    pub id: i64,
    pub invoice_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

// =============================================================================
// Engine Requests & Receipts
// =============================================================================
// The external web layer parses and authenticates, then hands these over.
// The engines never see HTTP, sessions, or templating.

/// One line of a sale cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Client-computed subtotal. The sale total is the sum of these;
    /// the engine trusts them (see DESIGN.md).
    pub subtotal_cents: i64,
}

/// Everything the sale engine needs to process one sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRequest {
    /// Cashier performing the sale - explicit identity, never ambient.
    pub cashier_id: i64,
    pub warehouse_id: i64,
    /// Missing payment method is a validation error, not a default.
    pub payment_method_id: Option<i64>,
    pub tendered_cents: i64,
    pub note: String,
    pub lines: Vec<CartLine>,
}

/// What the sale engine returns on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub invoice_id: i64,
    pub total_cents: i64,
    pub change_cents: i64,
}

/// One line of an inbound (stock-in) movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundLine {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_cost_cents: i64,
    pub total_cost_cents: i64,
}

/// Everything the movement engine needs to register a stock-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundRequest {
    pub movement_type_id: i64,
    pub supplier_id: Option<i64>,
    pub warehouse_id: i64,
    pub invoice_number: Option<String>,
    pub note: String,
    pub lines: Vec<InboundLine>,
}

/// One line of an outbound (stock-out) movement. Costs are optional:
/// the cost basis only moves on entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundLine {
    pub product_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub unit_cost_cents: i64,
    #[serde(default)]
    pub total_cost_cents: i64,
}

/// Everything the movement engine needs to register a stock-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundRequest {
    pub movement_type_id: i64,
    pub warehouse_id: i64,
    pub note: String,
    pub lines: Vec<OutboundLine>,
}

// =============================================================================
// Stock Alert
// =============================================================================

/// Severity tier for the low-stock report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockAlert {
    /// Nothing on hand at all.
    Critical,
    /// At or below half the minimum-stock threshold.
    VeryLow,
    /// At or below the minimum-stock threshold.
    Low,
}

impl StockAlert {
    /// Classifies quantity-on-hand against a minimum-stock threshold.
    /// Returns None when the product is comfortably above the threshold.
    pub fn classify(quantity_on_hand: i64, min_stock: i64) -> Option<StockAlert> {
        if quantity_on_hand > min_stock {
            None
        } else if quantity_on_hand <= 0 {
            Some(StockAlert::Critical)
        } else if quantity_on_hand * 2 <= min_stock {
            Some(StockAlert::VeryLow)
        } else {
            Some(StockAlert::Low)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_display() {
        assert_eq!(MovementDirection::Entrada.to_string(), "ENTRADA");
        assert_eq!(MovementDirection::Salida.to_string(), "SALIDA");
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::Administrator.can_manage_catalog());
        assert!(!Role::Cashier.can_manage_catalog());
    }

    #[test]
    fn test_stock_alert_tiers() {
        assert_eq!(StockAlert::classify(0, 10), Some(StockAlert::Critical));
        assert_eq!(StockAlert::classify(-2, 10), Some(StockAlert::Critical));
        assert_eq!(StockAlert::classify(5, 10), Some(StockAlert::VeryLow));
        assert_eq!(StockAlert::classify(8, 10), Some(StockAlert::Low));
        assert_eq!(StockAlert::classify(10, 10), Some(StockAlert::Low));
        assert_eq!(StockAlert::classify(11, 10), None);
    }

    #[test]
    fn test_product_low_stock() {
        let now = Utc::now();
        let product = Product {
            id: 1,
            description: "Azucar 1lb".to_string(),
            unit_id: 1,
            category_id: 1,
            sale_price_cents: 150,
            average_cost_cents: 90,
            quantity_on_hand: 4,
            min_stock: 5,
            is_active: true,
            created_by: 1,
            created_at: now,
            updated_at: now,
        };
        assert!(product.is_low_stock());
        assert_eq!(product.sale_price().cents(), 150);
    }
}
