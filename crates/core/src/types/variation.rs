//! Product variation groups and the customer's selection.
//!
//! A product carries an open set of variation groups ("Ring Size", "Metal",
//! "Stone" and so on), each offering options that may shift the base price. The
//! customer's chosen options form a [`VariationSelection`], which is part of
//! a cart line's identity.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The customer's chosen options, keyed by variation-group title.
///
/// Stored as a `BTreeMap` so two selections with the same pairs are equal
/// regardless of the order they were picked in; identity must never split
/// on map ordering.
pub type VariationSelection = BTreeMap<String, String>;

/// One selectable option within a variation group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationOption {
    /// Display value, e.g. "18k Gold" or "Size 7".
    pub value: String,
    /// Signed price adjustment relative to the product's base price.
    #[serde(default)]
    pub price_delta: Decimal,
}

/// A named group of variation options on a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationGroup {
    /// Group title, e.g. "Metal". Doubles as the selection key.
    pub title: String,
    pub options: Vec<VariationOption>,
}

impl VariationGroup {
    /// Find an option by its display value.
    #[must_use]
    pub fn option(&self, value: &str) -> Option<&VariationOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

/// The displayed price range of a product across all variation choices.
///
/// The minimum is the base price plus the cheapest option of every group;
/// the maximum takes the most expensive option of every group. A product
/// with no variations has a degenerate range of (base, base).
#[must_use]
pub fn price_range(base_price: Decimal, groups: &[VariationGroup]) -> (Decimal, Decimal) {
    let mut min = base_price;
    let mut max = base_price;

    for group in groups {
        let deltas = group.options.iter().map(|o| o.price_delta);
        if let Some(lo) = deltas.clone().min() {
            min += lo;
        }
        if let Some(hi) = deltas.max() {
            max += hi;
        }
    }

    (min, max)
}

/// The unit price implied by a selection: base price plus the delta of each
/// chosen option.
///
/// Returns `None` if the selection names a group or option the product does
/// not offer; callers treat that as a validation failure, not a price.
#[must_use]
pub fn selection_price(
    base_price: Decimal,
    groups: &[VariationGroup],
    selection: &VariationSelection,
) -> Option<Decimal> {
    let mut price = base_price;

    for (title, value) in selection {
        let group = groups.iter().find(|g| &g.title == title)?;
        let option = group.option(value)?;
        price += option.price_delta;
    }

    Some(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> Vec<VariationGroup> {
        vec![
            VariationGroup {
                title: "Metal".into(),
                options: vec![
                    VariationOption {
                        value: "Silver".into(),
                        price_delta: Decimal::ZERO,
                    },
                    VariationOption {
                        value: "18k Gold".into(),
                        price_delta: Decimal::new(15000, 2), // +150.00
                    },
                ],
            },
            VariationGroup {
                title: "Stone".into(),
                options: vec![
                    VariationOption {
                        value: "None".into(),
                        price_delta: Decimal::new(-2000, 2), // -20.00
                    },
                    VariationOption {
                        value: "Sapphire".into(),
                        price_delta: Decimal::new(8000, 2), // +80.00
                    },
                ],
            },
        ]
    }

    #[test]
    fn price_range_spans_cheapest_to_dearest_combination() {
        let base = Decimal::new(12000, 2); // 120.00
        let (min, max) = price_range(base, &groups());
        assert_eq!(min, Decimal::new(10000, 2)); // 120 + 0 - 20
        assert_eq!(max, Decimal::new(35000, 2)); // 120 + 150 + 80
    }

    #[test]
    fn price_range_without_variations_is_degenerate() {
        let base = Decimal::new(9999, 2);
        assert_eq!(price_range(base, &[]), (base, base));
    }

    #[test]
    fn selection_price_sums_chosen_deltas() {
        let base = Decimal::new(12000, 2);
        let mut selection = VariationSelection::new();
        selection.insert("Metal".into(), "18k Gold".into());
        selection.insert("Stone".into(), "Sapphire".into());

        assert_eq!(
            selection_price(base, &groups(), &selection),
            Some(Decimal::new(35000, 2))
        );
    }

    #[test]
    fn selection_price_rejects_unknown_options() {
        let base = Decimal::new(12000, 2);
        let mut selection = VariationSelection::new();
        selection.insert("Metal".into(), "Platinum".into());

        assert_eq!(selection_price(base, &groups(), &selection), None);
    }
}
