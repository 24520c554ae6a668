//! # Validation Module
//!
//! Input validation and cart math for Mostrador POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web layer (external collaborator)                            │
//! │  ├── Form/JSON parsing, authentication                                 │
//! │  └── Hands over typed, already-parsed parameters                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │  ├── Runs BEFORE any mutating statement executes                       │
//! │  └── Empty batches, missing fields, absurd quantities                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL, CHECK, UNIQUE constraints                               │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CartLine, InboundLine, OutboundLine};
use crate::{MAX_BATCH_LINES, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Batch Validators
// =============================================================================

fn validate_batch_size(operation: &str, len: usize) -> ValidationResult<()> {
    if len == 0 {
        return Err(ValidationError::EmptyBatch {
            operation: operation.to_string(),
        });
    }

    if len > MAX_BATCH_LINES {
        return Err(ValidationError::OutOfRange {
            field: format!("{operation} lines"),
            min: 1,
            max: MAX_BATCH_LINES as i64,
        });
    }

    Ok(())
}

fn validate_line_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a sale cart before any stock check or insert runs.
///
/// ## Rules
/// - Cart must not be empty
/// - Cart must not exceed [`MAX_BATCH_LINES`]
/// - Every line quantity must be positive and sane
pub fn validate_cart(lines: &[CartLine]) -> ValidationResult<()> {
    validate_batch_size("sale", lines.len())?;

    for line in lines {
        validate_line_quantity(line.quantity)?;
    }

    Ok(())
}

/// Validates inbound movement lines.
pub fn validate_inbound_lines(lines: &[InboundLine]) -> ValidationResult<()> {
    validate_batch_size("inbound movement", lines.len())?;

    for line in lines {
        validate_line_quantity(line.quantity)?;
    }

    Ok(())
}

/// Validates outbound movement lines.
pub fn validate_outbound_lines(lines: &[OutboundLine]) -> ValidationResult<()> {
    validate_batch_size("outbound movement", lines.len())?;

    for line in lines {
        validate_line_quantity(line.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates that a payment method was chosen, returning its id.
///
/// ## User Workflow
/// ```text
/// Tender screen → payment method dropdown left blank
///      │
///      ▼
/// validate_payment_method(None) ← THIS FUNCTION
///      │
///      ▼
/// Error: "payment method is required" - no invoice row was written
/// ```
pub fn validate_payment_method(payment_method_id: Option<i64>) -> ValidationResult<i64> {
    payment_method_id.ok_or_else(|| ValidationError::Required {
        field: "payment method".to_string(),
    })
}

/// Validates a free-text note.
///
/// ## Rules
/// - Can be empty
/// - Maximum 500 characters
pub fn validate_note(note: &str) -> ValidationResult<()> {
    if note.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: 500,
        });
    }

    Ok(())
}

/// Validates a username.
///
/// ## Rules
/// - Must not be empty
/// - Maximum 50 characters
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 50,
        });
    }

    Ok(())
}

/// Validates a product description.
///
/// ## Rules
/// - Must not be empty
/// - Maximum 200 characters
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Cart Math
// =============================================================================

/// Sums the client-sent line subtotals into the sale total.
///
/// The server trusts the client-computed subtotals rather than recomputing
/// price × quantity. Known integrity gap; see DESIGN.md.
pub fn cart_total(lines: &[CartLine]) -> Money {
    Money::from_cents(lines.iter().map(|l| l.subtotal_cents).sum())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cart_line(product_id: i64, quantity: i64, unit_price_cents: i64) -> CartLine {
        CartLine {
            product_id,
            quantity,
            unit_price_cents,
            subtotal_cents: unit_price_cents * quantity,
        }
    }

    #[test]
    fn empty_cart_is_rejected() {
        let err = validate_cart(&[]).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyBatch { .. }));
    }

    #[test]
    fn zero_or_negative_quantity_is_rejected() {
        assert!(validate_cart(&[cart_line(1, 0, 100)]).is_err());
        assert!(validate_cart(&[cart_line(1, -3, 100)]).is_err());
        assert!(validate_cart(&[cart_line(1, 2, 100)]).is_ok());
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let lines: Vec<CartLine> = (0..=MAX_BATCH_LINES as i64)
            .map(|i| cart_line(i + 1, 1, 100))
            .collect();
        assert!(validate_cart(&lines).is_err());
    }

    #[test]
    fn missing_payment_method_is_rejected() {
        assert!(validate_payment_method(None).is_err());
        assert_eq!(validate_payment_method(Some(2)).unwrap(), 2);
    }

    #[test]
    fn cart_total_sums_client_subtotals() {
        let lines = vec![cart_line(1, 2, 1000), cart_line(2, 1, 500)];
        assert_eq!(cart_total(&lines).cents(), 2500);
    }

    #[test]
    fn outbound_lines_validated_like_cart() {
        assert!(validate_outbound_lines(&[]).is_err());
        let line = OutboundLine {
            product_id: 1,
            quantity: 3,
            unit_cost_cents: 0,
            total_cost_cents: 0,
        };
        assert!(validate_outbound_lines(&[line]).is_ok());
    }

    #[test]
    fn note_and_description_limits() {
        assert!(validate_note("").is_ok());
        assert!(validate_note(&"x".repeat(501)).is_err());
        assert!(validate_description("Cafe molido 400g").is_ok());
        assert!(validate_description("   ").is_err());
    }
}
