//! The cart state model: line items, identity-based reconciliation, and a
//! wishlist that shares the same machinery.
//!
//! A [`Cart`] is an ordered snapshot of [`LineItem`]s. Every mutation is a
//! whole-value operation: read the list, compute the new list, write it
//! back. Persistence and change signalling live with the callers, which
//! keeps this module pure and trivially testable.

mod identity;
mod pricing;

pub use identity::ItemIdentity;
pub use pricing::{PricingBreakdown, ShippingPolicy};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, VariationSelection};

/// One product (plus chosen variations) and its quantity within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    /// Server-computed unit price (base price plus selected option deltas).
    pub unit_price: Decimal,
    /// Primary product image, if the product has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub quantity: u32,
    /// Chosen variation options, keyed by group title. Empty for products
    /// without variations.
    #[serde(default, skip_serializing_if = "VariationSelection::is_empty")]
    pub selected_variations: VariationSelection,
}

impl LineItem {
    /// The identity used to decide whether two additions refer to the same
    /// line: product id plus the full variation selection.
    #[must_use]
    pub fn identity(&self) -> ItemIdentity {
        ItemIdentity::new(self.product_id.clone(), self.selected_variations.clone())
    }

    /// Line total: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// An ordered snapshot of cart line items.
///
/// Insertion order is preserved: merging into an existing line keeps its
/// place, new lines append at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from already-validated line items.
    #[must_use]
    pub const fn from_items(items: Vec<LineItem>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of lines (not unit quantity).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total unit quantity across all lines (the header badge number).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Merge an incoming item into the cart.
    ///
    /// If a line with the same identity exists, its quantity grows by the
    /// incoming quantity and its descriptive fields (name, price, image)
    /// are left untouched (first write wins). Otherwise the item is
    /// appended as a new line.
    pub fn add_or_increment(&mut self, incoming: LineItem) {
        let identity = incoming.identity();
        match self.items.iter_mut().find(|i| i.identity() == identity) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(incoming.quantity);
            }
            None => self.items.push(incoming),
        }
    }

    /// Replace the quantity of the line matching `identity`.
    ///
    /// A quantity below 1 is a no-op: removal is an explicit operation, not
    /// a side effect of decrementing past zero.
    pub fn set_quantity(&mut self, identity: &ItemIdentity, quantity: u32) {
        if quantity < 1 {
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| &i.identity() == identity) {
            item.quantity = quantity;
        }
    }

    /// Remove the line(s) matching `identity`.
    pub fn remove(&mut self, identity: &ItemIdentity) {
        self.items.retain(|i| &i.identity() != identity);
    }

    /// Empty the cart. Idempotent.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of line totals, in exact decimal arithmetic.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }
}

/// One saved product on the wishlist.
///
/// Wishlist entries are keyed by product alone: saving a product is about
/// the product, not a particular variation of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Toggle a product on the wishlist: remove it if present, append otherwise.
///
/// Returns `true` if the item is on the list after the toggle.
pub fn toggle_wishlist(list: &mut Vec<WishlistItem>, item: WishlistItem) -> bool {
    let before = list.len();
    list.retain(|w| w.product_id != item.product_id);
    if list.len() < before {
        false
    } else {
        list.push(item);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: i64, qty: u32) -> LineItem {
        LineItem {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            unit_price: Decimal::new(price, 2),
            image: None,
            quantity: qty,
            selected_variations: VariationSelection::new(),
        }
    }

    fn item_with_variation(id: &str, price: i64, qty: u32, group: &str, value: &str) -> LineItem {
        let mut line = item(id, price, qty);
        line.selected_variations
            .insert(group.to_owned(), value.to_owned());
        line
    }

    #[test]
    fn adding_same_identity_merges_quantities() {
        let mut cart = Cart::new();
        cart.add_or_increment(item("r1", 12000, 1));
        cart.add_or_increment(item("r1", 12000, 2));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.subtotal(), Decimal::new(36000, 2));
    }

    #[test]
    fn merge_keeps_first_written_descriptive_fields() {
        let mut cart = Cart::new();
        cart.add_or_increment(item("r1", 12000, 1));

        // Same identity, different price: the original price survives.
        let mut repriced = item("r1", 99900, 1);
        repriced.name = "Renamed".into();
        cart.add_or_increment(repriced);

        assert_eq!(cart.items()[0].unit_price, Decimal::new(12000, 2));
        assert_eq!(cart.items()[0].name, "Product r1");
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn different_variations_are_different_lines() {
        let mut cart = Cart::new();
        cart.add_or_increment(item_with_variation("r1", 12000, 1, "Metal", "Silver"));
        cart.add_or_increment(item_with_variation("r1", 27000, 1, "Metal", "18k Gold"));

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn set_quantity_below_one_is_a_no_op() {
        let mut cart = Cart::new();
        cart.add_or_increment(item("r1", 12000, 3));
        let identity = cart.items()[0].identity();

        cart.set_quantity(&identity, 0);
        assert_eq!(cart.items()[0].quantity, 3);

        cart.set_quantity(&identity, 5);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn set_quantity_on_missing_identity_changes_nothing() {
        let mut cart = Cart::new();
        cart.add_or_increment(item("r1", 12000, 1));

        let ghost = item("r2", 500, 1).identity();
        cart.set_quantity(&ghost, 7);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn remove_filters_by_full_identity() {
        let mut cart = Cart::new();
        cart.add_or_increment(item_with_variation("r1", 12000, 1, "Metal", "Silver"));
        cart.add_or_increment(item_with_variation("r1", 27000, 1, "Metal", "18k Gold"));

        let silver = cart.items()[0].identity();
        cart.remove(&silver);

        assert_eq!(cart.len(), 1);
        assert_eq!(
            cart.items()[0].selected_variations.get("Metal").map(String::as_str),
            Some("18k Gold")
        );
    }

    #[test]
    fn clear_is_idempotent() {
        let mut cart = Cart::new();
        cart.add_or_increment(item("r1", 12000, 2));

        cart.clear();
        assert!(cart.is_empty());

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn order_of_lines_is_preserved() {
        let mut cart = Cart::new();
        cart.add_or_increment(item("a", 100, 1));
        cart.add_or_increment(item("b", 200, 1));
        cart.add_or_increment(item("a", 100, 1)); // merges into the first line

        let ids: Vec<&str> = cart.items().iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn wishlist_toggle_adds_then_removes() {
        let mut list = Vec::new();
        let entry = WishlistItem {
            product_id: ProductId::new("r1"),
            name: "Aurora Ring".into(),
            unit_price: Decimal::new(12000, 2),
            image: None,
        };

        assert!(toggle_wishlist(&mut list, entry.clone()));
        assert_eq!(list.len(), 1);

        assert!(!toggle_wishlist(&mut list, entry));
        assert!(list.is_empty());
    }
}
