//! Subtotal, shipping, and total derivation.
//!
//! Shipping is a single flat fee with an optional free-shipping threshold.
//! No taxes, no currency conversion, no per-item shipping.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Cart;

/// Admin-configured shipping rule, read by the storefront at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    /// Flat fee applied below the free-shipping threshold.
    #[serde(default)]
    pub standard_shipping_fee: Decimal,
    /// Subtotals at or above this ship free. Zero disables free shipping.
    #[serde(default)]
    pub free_shipping_threshold: Decimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            standard_shipping_fee: Decimal::ZERO,
            free_shipping_threshold: Decimal::ZERO,
        }
    }
}

impl ShippingPolicy {
    /// Shipping fee for a given subtotal under this policy.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if self.free_shipping_threshold > Decimal::ZERO
            && subtotal >= self.free_shipping_threshold
        {
            Decimal::ZERO
        } else {
            self.standard_shipping_fee
        }
    }
}

/// Derived totals for a cart under a shipping policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl PricingBreakdown {
    /// Quote a cart under a policy.
    #[must_use]
    pub fn quote(cart: &Cart, policy: &ShippingPolicy) -> Self {
        let subtotal = cart.subtotal();
        let shipping = policy.shipping_for(subtotal);
        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::LineItem;
    use crate::types::{ProductId, VariationSelection};

    fn policy(fee: i64, threshold: i64) -> ShippingPolicy {
        ShippingPolicy {
            standard_shipping_fee: Decimal::new(fee, 2),
            free_shipping_threshold: Decimal::new(threshold, 2),
        }
    }

    fn cart_with_subtotal(cents: i64) -> Cart {
        let mut cart = Cart::new();
        cart.add_or_increment(LineItem {
            product_id: ProductId::new("p"),
            name: "Pendant".into(),
            unit_price: Decimal::new(cents, 2),
            image: None,
            quantity: 1,
            selected_variations: VariationSelection::new(),
        });
        cart
    }

    #[test]
    fn below_threshold_pays_the_standard_fee() {
        let quote = PricingBreakdown::quote(&cart_with_subtotal(49999), &policy(1500, 50000));
        assert_eq!(quote.shipping, Decimal::new(1500, 2));
        assert_eq!(quote.total, Decimal::new(51499, 2));
    }

    #[test]
    fn at_threshold_ships_free() {
        let quote = PricingBreakdown::quote(&cart_with_subtotal(50000), &policy(1500, 50000));
        assert_eq!(quote.shipping, Decimal::ZERO);
        assert_eq!(quote.total, Decimal::new(50000, 2));
    }

    #[test]
    fn zero_threshold_disables_free_shipping() {
        let quote = PricingBreakdown::quote(&cart_with_subtotal(1_000_000), &policy(1500, 0));
        assert_eq!(quote.shipping, Decimal::new(1500, 2));
    }

    #[test]
    fn empty_cart_quotes_fee_only() {
        let quote = PricingBreakdown::quote(&Cart::new(), &policy(1500, 0));
        assert_eq!(quote.subtotal, Decimal::ZERO);
        assert_eq!(quote.total, Decimal::new(1500, 2));
    }

    #[test]
    fn decimal_accumulation_does_not_drift() {
        // 0.10 * 3 must be exactly 0.30, not 0.30000000000000004.
        let mut cart = Cart::new();
        cart.add_or_increment(LineItem {
            product_id: ProductId::new("charm"),
            name: "Charm".into(),
            unit_price: Decimal::new(10, 2),
            image: None,
            quantity: 3,
            selected_variations: VariationSelection::new(),
        });
        assert_eq!(cart.subtotal(), Decimal::new(30, 2));
    }
}
