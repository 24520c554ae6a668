//! # Movement Repository
//!
//! Read access to the append-only movement history plus the insert
//! primitives the engines compose inside their transactions. Movements are
//! never updated or deleted once written.

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};

use crate::error::DbResult;
use mostrador_core::{Movement, MovementDirection, MovementLine};

// =============================================================================
// Executor-Generic Inserts (used inside engine transactions)
// =============================================================================

/// Inserts a movement header and returns its generated id.
pub async fn insert_movement<'e, E>(
    executor: E,
    movement_type_id: i64,
    supplier_id: Option<i64>,
    invoice_number: Option<&str>,
    warehouse_id: i64,
    note: &str,
    created_at: DateTime<Utc>,
) -> DbResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO movements (
            movement_type_id, supplier_id, invoice_number,
            warehouse_id, note, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(movement_type_id)
    .bind(supplier_id)
    .bind(invoice_number)
    .bind(warehouse_id)
    .bind(note)
    .bind(created_at)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Inserts one movement line.
pub async fn insert_movement_line<'e, E>(
    executor: E,
    movement_id: i64,
    product_id: i64,
    quantity: i64,
    unit_cost_cents: i64,
    total_cost_cents: i64,
) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO movement_lines (
            movement_id, product_id, quantity, unit_cost_cents, total_cost_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(movement_id)
    .bind(product_id)
    .bind(quantity)
    .bind(unit_cost_cents)
    .bind(total_cost_cents)
    .execute(executor)
    .await?;

    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

const MOVEMENT_COLUMNS: &str = r#"
    id, movement_type_id, supplier_id, invoice_number,
    warehouse_id, note, created_at
"#;

/// Repository for movement history.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Gets a movement by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Movement>> {
        let movement: Option<Movement> = sqlx::query_as(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM movements WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(movement)
    }

    /// Gets the line items of a movement, in insertion order.
    pub async fn lines(&self, movement_id: i64) -> DbResult<Vec<MovementLine>> {
        let lines: Vec<MovementLine> = sqlx::query_as(
            r#"
            SELECT id, movement_id, product_id, quantity, unit_cost_cents, total_cost_cents
            FROM movement_lines
            WHERE movement_id = ?1
            ORDER BY id
            "#,
        )
        .bind(movement_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lists recent movements, newest first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Movement>> {
        let movements: Vec<Movement> = sqlx::query_as(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM movements
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Lists recent movements in one direction (the inbound and outbound
    /// history screens).
    pub async fn recent_by_direction(
        &self,
        direction: MovementDirection,
        limit: u32,
    ) -> DbResult<Vec<Movement>> {
        let movements: Vec<Movement> = sqlx::query_as(
            r#"
            SELECT m.id, m.movement_type_id, m.supplier_id, m.invoice_number,
                   m.warehouse_id, m.note, m.created_at
            FROM movements m
            JOIN movement_types mt ON mt.id = m.movement_type_id
            WHERE mt.direction = ?1
            ORDER BY m.created_at DESC, m.id DESC
            LIMIT ?2
            "#,
        )
        .bind(direction)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}
