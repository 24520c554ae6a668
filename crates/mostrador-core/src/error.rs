//! # Error Types
//!
//! Domain-specific error types for mostrador-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mostrador-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                        │
//! │  │     ├── InsufficientStock - carries the full shortage report         │
//! │  │     ├── InvalidMovementType - direction mismatch                     │
//! │  │     ├── Configuration - expected reference data missing              │
//! │  │     └── NotFound - referenced entity absent                          │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  mostrador-db errors (separate crate)                                   │
//! │  ├── DbError          - Datastore failures (the persistence wrapper)    │
//! │  └── EngineError      - What engine operations surface to callers       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → caller               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product description, quantities)
//! 3. Errors are enum variants, never String
//! 4. A failed batch reports EVERY offending line, not just the first

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::MovementDirection;

// =============================================================================
// Stock Shortage Report
// =============================================================================

/// One entry in a stock shortage report.
///
/// ## User Workflow
/// ```text
/// Sale cart: [X × 5, Y × 2]
///      │
///      ▼
/// Warehouse check: X has 3, Y has 2
///      │
///      ▼
/// InsufficientStock { shortages: [X: available 3, requested 5] }
///      │
///      ▼
/// Caller shows every short product, and NOTHING was written
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockShortage {
    pub product_id: i64,
    /// Product description at check time, for the user-facing report.
    pub description: String,
    pub available: i64,
    pub requested: i64,
}

impl std::fmt::Display for StockShortage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (available {}, requested {})",
            self.description, self.available, self.requested
        )
    }
}

fn format_shortages(shortages: &[StockShortage]) -> String {
    shortages
        .iter()
        .map(StockShortage::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Not enough warehouse stock to apply a sale or outbound batch.
    ///
    /// ## When This Occurs
    /// - Any cart line requests more than the warehouse holds
    /// - A product has no ledger row in the warehouse at all
    ///
    /// Carries one entry per short product - the batch is rejected as a
    /// whole and no partial application is ever visible.
    #[error("insufficient stock: {}", format_shortages(.shortages))]
    InsufficientStock { shortages: Vec<StockShortage> },

    /// A movement type was used against the wrong direction.
    ///
    /// ## When This Occurs
    /// - `register_inbound` called with a SALIDA type
    /// - `register_outbound` called with an ENTRADA type
    #[error(
        "movement type {movement_type_id} is {actual}, operation requires {expected}"
    )]
    InvalidMovementType {
        movement_type_id: i64,
        expected: MovementDirection,
        actual: MovementDirection,
    },

    /// Expected reference data is missing from the catalog.
    ///
    /// ## When This Occurs
    /// - No sale movement type (direction SALIDA, description VENTA) is
    ///   configured when processing a sale
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: i64 },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: i64) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur before any mutating statement executes.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A batch has no lines (empty cart, empty movement).
    #[error("{operation} has no lines")]
    EmptyBatch { operation: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_lists_every_short_product() {
        let err = CoreError::InsufficientStock {
            shortages: vec![
                StockShortage {
                    product_id: 1,
                    description: "Arroz 1lb".to_string(),
                    available: 3,
                    requested: 5,
                },
                StockShortage {
                    product_id: 2,
                    description: "Frijol 1lb".to_string(),
                    available: 0,
                    requested: 2,
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("Arroz 1lb (available 3, requested 5)"));
        assert!(msg.contains("Frijol 1lb (available 0, requested 2)"));
    }

    #[test]
    fn invalid_movement_type_message() {
        let err = CoreError::InvalidMovementType {
            movement_type_id: 7,
            expected: MovementDirection::Entrada,
            actual: MovementDirection::Salida,
        };
        assert_eq!(
            err.to_string(),
            "movement type 7 is SALIDA, operation requires ENTRADA"
        );
    }

    #[test]
    fn validation_converts_to_core_error() {
        let validation_err = ValidationError::EmptyBatch {
            operation: "sale".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
