//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, plus the
//! weighted-average cost math the inventory engine depends on.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many retail systems:                                                │
//! │    $10.00 / 3 = $3.33 (×3 = $9.99)  → Lost $0.01!                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1000 cents / 3 = 333 cents (×3 = 999 cents)                         │
//! │    We KNOW we lost 1 cent, and handle it explicitly                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mostrador_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1099); // 10.99
//!
//! // Arithmetic operations
//! let doubled = price * 2;                      // 21.98
//! let total = price + Money::from_cents(500);   // 15.99
//!
//! // NEVER do this:
//! // let bad = Money::from_float(10.99); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for corrections
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money flows
/// ```text
/// Product.sale_price_cents ──► CartLine.unit_price ──► Invoice.total
/// Product.average_cost_cents ──► weighted_average_cost ──► valuation
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use mostrador_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use mostrador_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // 2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897); // 8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Inventory Cost Math
// =============================================================================

/// Recomputes a product's running weighted-average cost after a stock-in line.
///
/// ## The Formula
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  WEIGHTED-AVERAGE COST                                                  │
/// │                                                                         │
/// │  prior: 100 units @ 5.00        incoming: 50 units @ 8.00              │
/// │                                                                         │
/// │            (100 × 5.00) + (50 × 8.00)                                   │
/// │  new  =  ───────────────────────────── = 900.00 / 150 = 6.00           │
/// │                   100 + 50                                              │
/// │                                                                         │
/// │  Empty product (prior quantity ≤ 0): the incoming unit cost IS the     │
/// │  new cost - there is nothing on hand to average against.               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Must be applied per line, in input order, with the pre-update quantity for
/// that product: later lines in the same batch see the already-updated
/// quantity and cost from earlier lines.
///
/// ## Rounding
/// Integer cents with half-up rounding on the final division. i128
/// intermediates prevent overflow on large quantities.
pub fn weighted_average_cost(
    prior_quantity: i64,
    prior_cost: Money,
    incoming_quantity: i64,
    incoming_unit_cost: Money,
) -> Money {
    if prior_quantity <= 0 {
        return incoming_unit_cost;
    }

    let prior_value = prior_quantity as i128 * prior_cost.cents() as i128;
    let incoming_value = incoming_quantity as i128 * incoming_unit_cost.cents() as i128;
    let total_quantity = (prior_quantity + incoming_quantity) as i128;

    let cents = (prior_value + incoming_value + total_quantity / 2) / total_quantity;
    Money::from_cents(cents as i64)
}

/// Computes change due to the customer: `max(tendered − total, 0)`.
///
/// Tendered below total yields zero change, not negative. The sale is
/// still accepted; the shortfall is a till matter, not a validation
/// failure.
#[inline]
pub fn change_due(total: Money, tendered: Money) -> Money {
    Money::from_cents((tendered.cents() - total.cents()).max(0))
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. Any UI formats for locale itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }

    #[test]
    fn average_cost_into_empty_product_takes_incoming_cost() {
        // 100 units @ 5.00 into an empty product → cost 5.00
        let cost = weighted_average_cost(0, Money::zero(), 100, Money::from_cents(500));
        assert_eq!(cost.cents(), 500);
    }

    #[test]
    fn average_cost_textbook_blend() {
        // 100 @ 5.00 on hand, inbound 50 @ 8.00
        // ((100×5.00)+(50×8.00))/150 = 6.00
        let cost = weighted_average_cost(
            100,
            Money::from_cents(500),
            50,
            Money::from_cents(800),
        );
        assert_eq!(cost.cents(), 600);
    }

    #[test]
    fn average_cost_rounds_half_up() {
        // 3 @ 1.00 and 1 @ 1.01 → 401/4 = 100.25 → 100
        let cost =
            weighted_average_cost(3, Money::from_cents(100), 1, Money::from_cents(101));
        assert_eq!(cost.cents(), 100);

        // 1 @ 1.00 and 1 @ 1.01 → 201/2 = 100.5 → 101
        let cost =
            weighted_average_cost(1, Money::from_cents(100), 1, Money::from_cents(101));
        assert_eq!(cost.cents(), 101);
    }

    #[test]
    fn average_cost_negative_prior_behaves_like_empty() {
        // Bookkeeping behind (negative on hand): incoming cost wins.
        let cost =
            weighted_average_cost(-4, Money::from_cents(350), 10, Money::from_cents(700));
        assert_eq!(cost.cents(), 700);
    }

    #[test]
    fn change_due_basic() {
        // total 20.00, tendered 25.00 → change 5.00
        let change = change_due(Money::from_cents(2000), Money::from_cents(2500));
        assert_eq!(change.cents(), 500);
    }

    #[test]
    fn change_due_never_negative() {
        let change = change_due(Money::from_cents(2000), Money::from_cents(1500));
        assert_eq!(change.cents(), 0);
    }
}
