//! # Pricing
//!
//! Turns a product's base price and fee settings into the unit price the
//! shopper pays.
//!
//! ## Fee Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  fee_included = true               fee_included = false                 │
//! │  ────────────────────              ─────────────────────                │
//! │  price_cents already has the fee   fee is added on top                  │
//! │                                                                         │
//! │  $11.90 @ 19%  ->  $11.90          $10.00 @ 19%  ->  $10.00 + $1.90     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart treats the resolver as a black box. Storefronts with other
//! rules (member pricing, rounding to .99) plug in their own
//! [`PriceResolver`], or a plain closure.

use crate::money::Money;
use crate::types::{FeeRate, LineItem, Product};

/// Maps (base price, fee-included flag, fee rate) to an effective unit price.
///
/// Implementations must be pure: the same inputs always give the same price.
pub trait PriceResolver {
    fn effective_price(&self, base: Money, fee_included: bool, fee_rate: FeeRate) -> Money;

    /// Effective unit price of `product`.
    fn unit_price(&self, product: &Product) -> Money {
        self.effective_price(product.price(), product.fee_included, product.fee_rate())
    }

    /// Effective unit price times the line quantity.
    fn line_total(&self, line: &LineItem) -> Money {
        self.unit_price(&line.product).multiply_quantity(line.quantity)
    }
}

impl<F> PriceResolver for F
where
    F: Fn(Money, bool, FeeRate) -> Money,
{
    fn effective_price(&self, base: Money, fee_included: bool, fee_rate: FeeRate) -> Money {
        self(base, fee_included, fee_rate)
    }
}

/// Default resolver: inclusive prices pass through, exclusive prices get the
/// fee added.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPricing;

impl PriceResolver for StandardPricing {
    fn effective_price(&self, base: Money, fee_included: bool, fee_rate: FeeRate) -> Money {
        if fee_included {
            base
        } else {
            base + base.calculate_fee(fee_rate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusive_price_is_unchanged() {
        let price =
            StandardPricing.effective_price(Money::from_cents(1190), true, FeeRate::from_bps(1900));
        assert_eq!(price.cents(), 1190);
    }

    #[test]
    fn test_exclusive_price_adds_fee() {
        let price =
            StandardPricing.effective_price(Money::from_cents(1000), false, FeeRate::from_bps(1900));
        assert_eq!(price.cents(), 1190);
    }

    #[test]
    fn test_line_total_uses_quantity() {
        let product = Product {
            fee_rate_bps: 825,
            ..Product::new("soap", "Soap", 1000)
        };
        let line = LineItem::new(product, 3, None, None);

        // $10.83 x 3
        assert_eq!(StandardPricing.line_total(&line).cents(), 3249);
    }

    #[test]
    fn test_closure_resolver() {
        let flat_discount = |base: Money, _: bool, _: FeeRate| base - Money::from_cents(100);
        let product = Product::new("tea", "Green Tea", 600);
        assert_eq!(flat_discount.unit_price(&product).cents(), 500);
    }
}
