//! # Catalog Repository
//!
//! Reference data behind the product catalog and the engines: categories,
//! units of measure, warehouses, payment methods and movement types.
//!
//! These tables are small, change rarely, and are hard-deleted when they
//! change at all. History tables reference them by id, so deletion is only
//! offered where nothing points at the row yet; a foreign-key violation
//! surfaces as [`DbError::ForeignKeyViolation`] otherwise.

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use mostrador_core::{Category, MovementDirection, MovementType, PaymentMethod, Unit, Warehouse};

/// Repository for catalog reference data.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

// =============================================================================
// Executor-Generic Lookups (used inside engine transactions)
// =============================================================================

/// Fetches a movement type by id, inside or outside a transaction.
pub async fn movement_type_by_id<'e, E>(
    executor: E,
    id: i64,
) -> DbResult<Option<MovementType>>
where
    E: SqliteExecutor<'e>,
{
    let movement_type: Option<MovementType> = sqlx::query_as(
        "SELECT id, description, direction, letter FROM movement_types WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(movement_type)
}

/// Fetches a payment method by id, inside or outside a transaction.
pub async fn payment_method_by_id<'e, E>(
    executor: E,
    id: i64,
) -> DbResult<Option<PaymentMethod>>
where
    E: SqliteExecutor<'e>,
{
    let method: Option<PaymentMethod> =
        sqlx::query_as("SELECT id, name FROM payment_methods WHERE id = ?1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

    Ok(method)
}

/// Finds the movement type the sale engine stamps on its synthetic
/// movements: outbound direction with "VENTA" in the description.
pub async fn find_sale_movement_type<'e, E>(executor: E) -> DbResult<Option<MovementType>>
where
    E: SqliteExecutor<'e>,
{
    let movement_type: Option<MovementType> = sqlx::query_as(
        r#"
        SELECT id, description, direction, letter
        FROM movement_types
        WHERE direction = 'SALIDA' AND description LIKE '%VENTA%'
        ORDER BY id
        LIMIT 1
        "#,
    )
    .fetch_optional(executor)
    .await?;

    Ok(movement_type)
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Lists all categories ordered by description.
    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let categories: Vec<Category> =
            sqlx::query_as("SELECT id, description FROM categories ORDER BY description")
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    /// Gets a category by id.
    pub async fn get_category(&self, id: i64) -> DbResult<Option<Category>> {
        let category: Option<Category> =
            sqlx::query_as("SELECT id, description FROM categories WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(category)
    }

    /// Inserts a category and returns its id.
    pub async fn insert_category(&self, description: &str) -> DbResult<i64> {
        debug!(description, "Inserting category");

        let result = sqlx::query("INSERT INTO categories (description) VALUES (?1)")
            .bind(description)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Renames a category.
    pub async fn rename_category(&self, id: i64, description: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE categories SET description = ?2 WHERE id = ?1")
            .bind(id)
            .bind(description)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    /// Deletes a category. Fails with a foreign-key violation if any
    /// product still references it.
    pub async fn delete_category(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    // =========================================================================
    // Units
    // =========================================================================

    /// Lists all units of measure ordered by description.
    pub async fn list_units(&self) -> DbResult<Vec<Unit>> {
        let units: Vec<Unit> =
            sqlx::query_as("SELECT id, description, abbreviation FROM units ORDER BY description")
                .fetch_all(&self.pool)
                .await?;

        Ok(units)
    }

    /// Inserts a unit of measure and returns its id.
    pub async fn insert_unit(&self, description: &str, abbreviation: &str) -> DbResult<i64> {
        debug!(description, abbreviation, "Inserting unit");

        let result = sqlx::query("INSERT INTO units (description, abbreviation) VALUES (?1, ?2)")
            .bind(description)
            .bind(abbreviation)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Renames a unit of measure.
    pub async fn rename_unit(
        &self,
        id: i64,
        description: &str,
        abbreviation: &str,
    ) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE units SET description = ?2, abbreviation = ?3 WHERE id = ?1")
                .bind(id)
                .bind(description)
                .bind(abbreviation)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Unit", id));
        }

        Ok(())
    }

    /// Deletes a unit. Fails with a foreign-key violation if any product
    /// still references it.
    pub async fn delete_unit(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM units WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Unit", id));
        }

        Ok(())
    }

    // =========================================================================
    // Warehouses
    // =========================================================================

    /// Lists all warehouses ordered by name.
    pub async fn list_warehouses(&self) -> DbResult<Vec<Warehouse>> {
        let warehouses: Vec<Warehouse> =
            sqlx::query_as("SELECT id, name FROM warehouses ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(warehouses)
    }

    /// Gets a warehouse by id.
    pub async fn get_warehouse(&self, id: i64) -> DbResult<Option<Warehouse>> {
        let warehouse: Option<Warehouse> =
            sqlx::query_as("SELECT id, name FROM warehouses WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(warehouse)
    }

    /// Inserts a warehouse and returns its id.
    pub async fn insert_warehouse(&self, name: &str) -> DbResult<i64> {
        debug!(name, "Inserting warehouse");

        let result = sqlx::query("INSERT INTO warehouses (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    // =========================================================================
    // Payment Methods
    // =========================================================================

    /// Lists all payment methods ordered by id (stable display order).
    pub async fn list_payment_methods(&self) -> DbResult<Vec<PaymentMethod>> {
        let methods: Vec<PaymentMethod> =
            sqlx::query_as("SELECT id, name FROM payment_methods ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(methods)
    }

    /// Gets a payment method by id.
    pub async fn get_payment_method(&self, id: i64) -> DbResult<Option<PaymentMethod>> {
        let method: Option<PaymentMethod> =
            sqlx::query_as("SELECT id, name FROM payment_methods WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(method)
    }

    /// Inserts a payment method and returns its id.
    pub async fn insert_payment_method(&self, name: &str) -> DbResult<i64> {
        debug!(name, "Inserting payment method");

        let result = sqlx::query("INSERT INTO payment_methods (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    // =========================================================================
    // Movement Types
    // =========================================================================

    /// Lists all movement types ordered by description.
    pub async fn list_movement_types(&self) -> DbResult<Vec<MovementType>> {
        let types: Vec<MovementType> = sqlx::query_as(
            "SELECT id, description, direction, letter FROM movement_types ORDER BY description",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }

    /// Lists movement types for one direction, for the inbound and
    /// outbound entry screens.
    pub async fn list_movement_types_by_direction(
        &self,
        direction: MovementDirection,
    ) -> DbResult<Vec<MovementType>> {
        let types: Vec<MovementType> = sqlx::query_as(
            r#"
            SELECT id, description, direction, letter
            FROM movement_types
            WHERE direction = ?1
            ORDER BY description
            "#,
        )
        .bind(direction)
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }

    /// Gets a movement type by id.
    pub async fn get_movement_type(&self, id: i64) -> DbResult<Option<MovementType>> {
        movement_type_by_id(&self.pool, id).await
    }

    /// Inserts a movement type and returns its id.
    pub async fn insert_movement_type(
        &self,
        description: &str,
        direction: MovementDirection,
        letter: &str,
    ) -> DbResult<i64> {
        debug!(description, %direction, "Inserting movement type");

        let result = sqlx::query(
            "INSERT INTO movement_types (description, direction, letter) VALUES (?1, ?2, ?3)",
        )
        .bind(description)
        .bind(direction)
        .bind(letter)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
