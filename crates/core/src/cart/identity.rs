//! Line-item identity.
//!
//! Two historical cart implementations disagreed on what made two additions
//! "the same line": one keyed on product id plus a fixed size/color pair,
//! the other on product id alone. The consolidated rule is product id plus
//! the full variation selection; a product without variations is simply the
//! empty-selection case.

use serde::{Deserialize, Serialize};

use crate::types::{ProductId, VariationSelection};

/// The key deciding whether two cart additions refer to the same line.
///
/// The selection is a `BTreeMap`, so identity is insensitive to the order
/// options were chosen in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemIdentity {
    pub product_id: ProductId,
    pub selected_variations: VariationSelection,
}

impl ItemIdentity {
    #[must_use]
    pub const fn new(product_id: ProductId, selected_variations: VariationSelection) -> Self {
        Self {
            product_id,
            selected_variations,
        }
    }

    /// Identity for a product without variation choices.
    #[must_use]
    pub fn bare(product_id: ProductId) -> Self {
        Self {
            product_id,
            selected_variations: VariationSelection::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_order_does_not_split_identity() {
        let mut first = VariationSelection::new();
        first.insert("Metal".into(), "Silver".into());
        first.insert("Stone".into(), "Sapphire".into());

        let mut second = VariationSelection::new();
        second.insert("Stone".into(), "Sapphire".into());
        second.insert("Metal".into(), "Silver".into());

        assert_eq!(
            ItemIdentity::new(ProductId::new("r1"), first),
            ItemIdentity::new(ProductId::new("r1"), second)
        );
    }

    #[test]
    fn bare_identity_equals_empty_selection() {
        assert_eq!(
            ItemIdentity::bare(ProductId::new("r1")),
            ItemIdentity::new(ProductId::new("r1"), VariationSelection::new())
        );
    }

    #[test]
    fn different_selections_are_different_identities() {
        let mut silver = VariationSelection::new();
        silver.insert("Metal".into(), "Silver".into());

        let mut gold = VariationSelection::new();
        gold.insert("Metal".into(), "18k Gold".into());

        assert_ne!(
            ItemIdentity::new(ProductId::new("r1"), silver),
            ItemIdentity::new(ProductId::new("r1"), gold)
        );
    }
}
