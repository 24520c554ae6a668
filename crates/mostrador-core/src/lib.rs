//! # mostrador-core: Pure Business Logic for Mostrador POS
//!
//! This crate is the **heart** of Mostrador POS. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Mostrador POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Web layer (EXTERNAL COLLABORATOR)                  │   │
//! │  │    routes ──► session/auth ──► parsed, authenticated params     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ mostrador-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   error   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ CoreError │  │   rules   │  │   │
//! │  │   │ Movement  │  │ avg cost  │  │ shortages │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 mostrador-db (Database Layer)                   │   │
//! │  │      SQLite repositories, sale engine, movement engine          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Movement, Invoice, closed enums)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types, including the stock shortage report
//! - [`validation`] - Business rule validation and cart math
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Closed Enumerations**: Direction tags and roles are enums with exhaustive
//!    matching, never loose strings - a typo'd tag cannot silently match nothing
//! 5. **Explicit Identity**: Who performs an operation is always a parameter,
//!    never ambient session state

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use mostrador_core::Money` instead of
// `use mostrador_core::money::Money`

pub use error::{CoreError, StockShortage, ValidationError};
pub use money::{change_due, weighted_average_cost, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart or movement batch.
///
/// ## Business Reason
/// Prevents runaway batches and ensures reasonable transaction sizes.
pub const MAX_BATCH_LINES: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 10000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// Default minimum-stock threshold for new products.
pub const DEFAULT_MIN_STOCK: i64 = 5;
