//! # Invoice Repository
//!
//! Read access to the invoice history plus the insert primitives the sale
//! engine composes inside its transaction. Invoices are append-only; a
//! mistaken sale is cancelled by flipping is_active, never by deleting.

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use mostrador_core::{Invoice, InvoiceLine};

// =============================================================================
// Executor-Generic Inserts (used inside the sale engine transaction)
// =============================================================================

/// Inserts an invoice header and returns its generated id.
#[allow(clippy::too_many_arguments)]
pub async fn insert_invoice<'e, E>(
    executor: E,
    total_cents: i64,
    tendered_cents: i64,
    change_cents: i64,
    payment_method_id: i64,
    note: &str,
    cashier_id: i64,
    created_at: DateTime<Utc>,
) -> DbResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO invoices (
            total_cents, tendered_cents, change_cents,
            payment_method_id, note, cashier_id, is_active, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)
        "#,
    )
    .bind(total_cents)
    .bind(tendered_cents)
    .bind(change_cents)
    .bind(payment_method_id)
    .bind(note)
    .bind(cashier_id)
    .bind(created_at)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Inserts one invoice line.
pub async fn insert_invoice_line<'e, E>(
    executor: E,
    invoice_id: i64,
    product_id: i64,
    quantity: i64,
    unit_price_cents: i64,
    subtotal_cents: i64,
) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO invoice_lines (
            invoice_id, product_id, quantity, unit_price_cents, subtotal_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(invoice_id)
    .bind(product_id)
    .bind(quantity)
    .bind(unit_price_cents)
    .bind(subtotal_cents)
    .execute(executor)
    .await?;

    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

const INVOICE_COLUMNS: &str = r#"
    id, total_cents, tendered_cents, change_cents,
    payment_method_id, note, cashier_id, is_active, created_at
"#;

/// Repository for invoice history.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Gets an invoice by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Invoice>> {
        let invoice: Option<Invoice> = sqlx::query_as(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    /// Gets the line items of an invoice, in insertion order.
    pub async fn lines(&self, invoice_id: i64) -> DbResult<Vec<InvoiceLine>> {
        let lines: Vec<InvoiceLine> = sqlx::query_as(
            r#"
            SELECT id, invoice_id, product_id, quantity, unit_price_cents, subtotal_cents
            FROM invoice_lines
            WHERE invoice_id = ?1
            ORDER BY id
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lists recent invoices, newest first, optionally scoped to one
    /// cashier (cashiers see their own sales, administrators see all).
    pub async fn recent(&self, limit: u32, cashier_id: Option<i64>) -> DbResult<Vec<Invoice>> {
        let invoices: Vec<Invoice> = sqlx::query_as(&format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE ?2 IS NULL OR cashier_id = ?2
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            "#
        ))
        .bind(limit)
        .bind(cashier_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    /// Cancels an invoice by flipping is_active.
    ///
    /// Stock is NOT restored here; a correcting inbound movement does
    /// that, keeping the ledger append-only.
    pub async fn cancel(&self, id: i64) -> DbResult<()> {
        debug!(id, "Cancelling invoice");

        let result = sqlx::query("UPDATE invoices SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        Ok(())
    }
}
