//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A cash drawer that sums floats drifts:                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  Shift totals are summed over hundreds of orders, then compared        │
//! │  against counted cash. A drift of one cent shows up as a variance.     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    start 1000 + sales 750 = expected 1750, exactly                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shiftbook_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//!
//! let doubled = price * 2;                        // $21.98
//! let total = price + Money::from_cents(500);     // $15.99
//! assert_eq!(total.cents(), 1599);
//!
//! // Drawer balances may not go negative
//! assert!(Money::from_cents(100).checked_sub_non_negative(Money::from_cents(200)).is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Variances and option discounts can be negative
/// - **Single field tuple struct**: Serializes as a bare integer on the wire
/// - **Checked variants**: Aggregates use `checked_*` so overflow is an error,
///   never a wrap-around
///
/// ## Where Money Flows
/// ```text
/// LineItem.unit_price ──► Order.total_amount ──► Shift.total_sales
///                                 │                     │
///                                 ▼                     ▼
///               cash_received - total = change    start + sales = expected
///                                                       │
///                                                       ▼
///                                          end_cash - expected = variance
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use shiftbook_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value that must not be negative.
    ///
    /// Used for amounts an operator declares: opening float, counted cash,
    /// tendered cash.
    ///
    /// ## Example
    /// ```rust
    /// use shiftbook_core::money::Money;
    ///
    /// assert!(Money::non_negative("startCashAmount", 1000).is_ok());
    /// assert!(Money::non_negative("startCashAmount", -1).is_err());
    /// ```
    pub fn non_negative(field: &str, cents: i64) -> CoreResult<Self> {
        if cents < 0 {
            return Err(CoreError::InvalidAmount {
                field: field.to_string(),
                cents,
            });
        }
        Ok(Money(cents))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    ///
    /// ## Example
    /// ```rust
    /// use shiftbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).dollars(), 10);
    /// assert_eq!(Money::from_cents(-550).dollars(), -5);
    /// ```
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
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

    /// Adds two amounts, failing instead of wrapping on overflow.
    pub fn checked_add(self, other: Money) -> CoreResult<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(CoreError::AmountOverflow)
    }

    /// Subtracts `other`, failing with `NegativeResult` if the balance would
    /// drop below zero.
    ///
    /// ## Example
    /// ```rust
    /// use shiftbook_core::money::Money;
    ///
    /// let tendered = Money::from_cents(500);
    /// let total = Money::from_cents(430);
    /// assert_eq!(tendered.checked_sub_non_negative(total).unwrap().cents(), 70);
    /// ```
    pub fn checked_sub_non_negative(self, other: Money) -> CoreResult<Money> {
        let result = self
            .0
            .checked_sub(other.0)
            .ok_or(CoreError::AmountOverflow)?;
        if result < 0 {
            return Err(CoreError::NegativeResult {
                minuend: self.0,
                subtrahend: other.0,
            });
        }
        Ok(Money(result))
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use shiftbook_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Multiplies by a quantity, failing instead of wrapping on overflow.
    pub fn checked_multiply_quantity(self, qty: i64) -> CoreResult<Money> {
        self.0
            .checked_mul(qty)
            .map(Money)
            .ok_or(CoreError::AmountOverflow)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// Consoles do their own localized formatting; this is for logs and receipts.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ts_rs::TS;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_non_negative_rejects_negative() {
        let err = Money::non_negative("endCashAmount", -5).unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { cents: -5, .. }));
        assert_eq!(Money::non_negative("endCashAmount", 0).unwrap(), Money::zero());
    }

    #[test]
    fn test_checked_sub_non_negative() {
        let cash = Money::from_cents(400);
        let total = Money::from_cents(430);

        let err = cash.checked_sub_non_negative(total).unwrap_err();
        assert!(matches!(
            err,
            CoreError::NegativeResult {
                minuend: 400,
                subtrahend: 430
            }
        ));

        let change = Money::from_cents(500).checked_sub_non_negative(total).unwrap();
        assert_eq!(change.cents(), 70);
    }

    #[test]
    fn test_checked_overflow() {
        let max = Money::from_cents(i64::MAX);
        assert!(matches!(
            max.checked_add(Money::from_cents(1)),
            Err(CoreError::AmountOverflow)
        ));
        assert!(matches!(
            max.checked_multiply_quantity(2),
            Err(CoreError::AmountOverflow)
        ));
    }

    #[test]
    fn test_sum() {
        let total: Money = [280, 160].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 440);
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&Money::from_cents(1750)).unwrap();
        assert_eq!(json, "1750");
        let back: Money = serde_json::from_str("1750").unwrap();
        assert_eq!(back.cents(), 1750);
    }

    #[test]
    fn test_typescript_binding_is_number() {
        assert_eq!(Money::inline(), "number");
    }
}
