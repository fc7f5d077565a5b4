//! # Money Module
//!
//! Provides the `Money` type used for every price and total in the cart.
//!
//! ## Integer Minor Units
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Storefront prices arrive as decimals (19.99), but the cart never      │
//! │  stores them that way:                                                  │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004      (float)                        │
//! │    10 + 20   = 30 cents                 (Money)                        │
//! │                                                                         │
//! │  Line totals and cart totals are sums of integers, so the amount the   │
//! │  header badge shows is exactly the amount checkout receives.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vitrine_core::money::Money;
//!
//! let price = Money::from_cents(1999); // $19.99
//! let line = price * 3;                // $59.97
//! assert_eq!(line.cents(), 5997);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::FeeRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD).
///
/// Signed so that refunds and price adjustments can be represented, even
/// though the cart itself only ever produces non-negative totals for
/// positive quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use vitrine_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion, truncated toward zero.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates a percentage fee on this amount.
    ///
    /// Integer math: `(amount * bps + 5000) / 10000`. The `+ 5000` rounds
    /// half up; i128 keeps large carts from overflowing the intermediate.
    ///
    /// ```rust
    /// use vitrine_core::money::Money;
    /// use vitrine_core::types::FeeRate;
    ///
    /// // $10.00 at 8.25% = $0.825 -> $0.83
    /// let fee = Money::from_cents(1000).calculate_fee(FeeRate::from_bps(825));
    /// assert_eq!(fee.cents(), 83);
    /// ```
    pub fn calculate_fee(&self, rate: FeeRate) -> Money {
        let fee_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(fee_cents.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Multiplies a unit price by a line quantity, saturating at the `i64`
    /// bounds.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering (`$12.34`, `-$5.50`). Localized display belongs
/// to the storefront.
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by a line quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

/// Summing line totals into a cart total.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
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
        assert_eq!(a.multiply_quantity(4).cents(), 4000);
    }

    #[test]
    fn test_arithmetic_saturates_at_bounds() {
        let max = Money::from_cents(i64::MAX);
        let min = Money::from_cents(i64::MIN);

        assert_eq!((max + Money::from_cents(1)).cents(), i64::MAX);
        assert_eq!((min - Money::from_cents(1)).cents(), i64::MIN);
        assert_eq!((max * 2).cents(), i64::MAX);
        assert_eq!(Money::from_cents(1200).multiply_quantity(i64::MAX).cents(), i64::MAX);

        let mut total = max;
        total += max;
        assert_eq!(total.cents(), i64::MAX);

        let total: Money = vec![max, max, Money::from_cents(5)].into_iter().sum();
        assert_eq!(total.cents(), i64::MAX);
    }

    #[test]
    fn test_sum_of_lines() {
        let lines = vec![
            Money::from_cents(1999),
            Money::from_cents(250),
            Money::from_cents(1),
        ];
        let total: Money = lines.into_iter().sum();
        assert_eq!(total.cents(), 2250);

        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_fee_calculation_rounds_half_up() {
        // $10.00 at 10% = $1.00
        let amount = Money::from_cents(1000);
        assert_eq!(amount.calculate_fee(FeeRate::from_bps(1000)).cents(), 100);

        // $10.00 at 8.25% = $0.825 -> $0.83
        assert_eq!(amount.calculate_fee(FeeRate::from_bps(825)).cents(), 83);

        // Zero rate never adds anything
        assert!(amount.calculate_fee(FeeRate::zero()).is_zero());
    }

    #[test]
    fn test_fee_calculation_large_amount_does_not_overflow() {
        let amount = Money::from_cents(i64::MAX / 2);
        let fee = amount.calculate_fee(FeeRate::from_bps(1900));
        assert!(fee.cents() > 0);
        assert!(fee < amount);
    }
}
