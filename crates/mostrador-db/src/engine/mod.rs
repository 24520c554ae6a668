//! # Engine Module
//!
//! The transactional heart of Mostrador POS: the sale engine and the
//! movement engine. Each public engine operation is exactly one database
//! transaction.
//!
//! ## One Operation, One Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  process_sale / register_inbound / register_outbound                    │
//! │                                                                         │
//! │  validate request          (no database touched yet)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN ──► read state ──► business checks ──► writes ──► COMMIT         │
//! │                │                 │                                      │
//! │                └── any Err(...)? ┴──► early return drops the            │
//! │                                       transaction = ROLLBACK            │
//! │                                                                         │
//! │  No partial sales, no half-applied movements, ever.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Business rules (stock sufficiency, direction matching, cost math) fail
//! as [`EngineError::Core`]; infrastructure failures as [`EngineError::Db`].

use thiserror::Error;

use crate::error::DbError;
use mostrador_core::CoreError;

pub mod movement;
pub mod sale;

/// Errors produced by the sale and movement engines.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A business rule rejected the request (validation, insufficient
    /// stock, wrong movement direction, missing entity, misconfiguration).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The database layer failed.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
