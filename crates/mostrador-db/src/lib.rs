//! # mostrador-db: Database Layer for Mostrador POS
//!
//! This crate provides database access for the Mostrador POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Mostrador POS Data Flow                            │
//! │                                                                         │
//! │  Web handler (POST /ventas)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   mostrador-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │   Engines    │  │   │
//! │  │   │   (pool.rs)   │    │ (product.rs,  │    │  (sale.rs,   │  │   │
//! │  │   │               │    │  catalog.rs,  │    │ movement.rs) │  │   │
//! │  │   │ SqlitePool    │◄───│  report.rs,   │◄───│ one op =     │  │   │
//! │  │   │ Migrations    │    │  ...)         │    │ one txn      │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL mode)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, catalog, ...)
//! - [`engine`] - The transactional sale and movement engines
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mostrador_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/mostrador.db")).await?;
//!
//! // Repositories for single-statement operations
//! let products = db.products().search("cola", None, 20).await?;
//!
//! // Engines for multi-row transactional mutations
//! let receipt = db.sale_engine().process_sale(request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod testutil;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::movement::MovementEngine;
pub use engine::sale::SaleEngine;
pub use engine::{EngineError, EngineResult};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::movement::MovementRepository;
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
pub use repository::stock::StockRepository;
pub use repository::supplier::SupplierRepository;
pub use repository::user::UserRepository;
