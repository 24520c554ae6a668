//! # Supplier Repository
//!
//! Suppliers are referenced by inbound movements, so deletion checks for
//! history first and refuses with a foreign-key violation when any exists.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use mostrador_core::Supplier;

/// Fields required to create or update a supplier.
#[derive(Debug, Clone)]
pub struct SupplierInput {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub tax_id: String,
}

impl SupplierInput {
    /// Supplier with only a name; contact fields can be filled in later.
    pub fn named(name: impl Into<String>) -> Self {
        SupplierInput {
            name: name.into(),
            phone: String::new(),
            address: String::new(),
            tax_id: String::new(),
        }
    }
}

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Inserts a supplier and returns its id.
    pub async fn insert(&self, input: &SupplierInput) -> DbResult<i64> {
        debug!(name = %input.name, "Inserting supplier");

        let result = sqlx::query(
            "INSERT INTO suppliers (name, phone, address, tax_id) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.tax_id)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Gets a supplier by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Supplier>> {
        let supplier: Option<Supplier> =
            sqlx::query_as("SELECT id, name, phone, address, tax_id FROM suppliers WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(supplier)
    }

    /// Lists all suppliers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers: Vec<Supplier> =
            sqlx::query_as("SELECT id, name, phone, address, tax_id FROM suppliers ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(suppliers)
    }

    /// Updates a supplier's contact fields.
    pub async fn update(&self, id: i64, input: &SupplierInput) -> DbResult<()> {
        debug!(id, "Updating supplier");

        let result = sqlx::query(
            r#"
            UPDATE suppliers
            SET name = ?2, phone = ?3, address = ?4, tax_id = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.tax_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }

    /// Deletes a supplier, refusing if inbound movements reference it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting supplier");

        let references: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM movements WHERE supplier_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if references > 0 {
            return Err(DbError::ForeignKeyViolation {
                message: format!("supplier {id} is referenced by {references} movement(s)"),
            });
        }

        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }
}
