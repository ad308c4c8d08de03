//! Cart and wishlist operations over a slot store.
//!
//! Every mutation follows the same sequence: load the full list, apply the
//! pure reconciliation from `aurelle-core`, save the full list, then publish
//! the matching change topic. Subscribers learn only that something changed
//! and re-read through the same store.

use aurelle_core::{Cart, ItemIdentity, LineItem, WishlistItem, toggle_wishlist};

use super::notifier::{ChangeNotifier, ChangeTopic};
use super::store::{SlotStore, StoreError, decode_cart, decode_wishlist};

/// Cart/wishlist service over an injectable slot store.
pub struct CartService<S> {
    store: S,
    notifier: ChangeNotifier,
}

impl<S: SlotStore> CartService<S> {
    pub const fn new(store: S, notifier: ChangeNotifier) -> Self {
        Self { store, notifier }
    }

    /// The notifier mutations publish on, for subscribers.
    #[must_use]
    pub const fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Slot name for a session's cart.
    #[must_use]
    pub fn cart_slot(key: &str) -> String {
        format!("cart:{key}")
    }

    /// Slot name for a session's wishlist.
    #[must_use]
    pub fn wishlist_slot(key: &str) -> String {
        format!("wishlist:{key}")
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Load the current cart snapshot. Missing or corrupt slots are empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only for transport failures.
    pub async fn cart(&self, key: &str) -> Result<Cart, StoreError> {
        let slot = Self::cart_slot(key);
        let raw = self.store.read(&slot).await?;
        Ok(decode_cart(&slot, raw))
    }

    /// Merge an item into the cart (see [`Cart::add_or_increment`]).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the slot cannot be read or written.
    pub async fn add_item(&self, key: &str, item: LineItem) -> Result<Cart, StoreError> {
        self.mutate_cart(key, |cart| cart.add_or_increment(item)).await
    }

    /// Replace a line's quantity; quantities below 1 are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the slot cannot be read or written.
    pub async fn set_quantity(
        &self,
        key: &str,
        identity: &ItemIdentity,
        quantity: u32,
    ) -> Result<Cart, StoreError> {
        self.mutate_cart(key, |cart| cart.set_quantity(identity, quantity))
            .await
    }

    /// Remove a line by identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the slot cannot be read or written.
    pub async fn remove_item(&self, key: &str, identity: &ItemIdentity) -> Result<Cart, StoreError> {
        self.mutate_cart(key, |cart| cart.remove(identity)).await
    }

    /// Empty the cart. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the slot cannot be read or written.
    pub async fn clear(&self, key: &str) -> Result<Cart, StoreError> {
        self.mutate_cart(key, Cart::clear).await
    }

    async fn mutate_cart(
        &self,
        key: &str,
        mutate: impl FnOnce(&mut Cart),
    ) -> Result<Cart, StoreError> {
        let slot = Self::cart_slot(key);
        let raw = self.store.read(&slot).await?;
        let mut cart = decode_cart(&slot, raw);

        mutate(&mut cart);

        let json = serde_json::to_string(&cart)?;
        self.store.write(&slot, &json).await?;
        // Publish strictly after the write so re-readers see the new value.
        self.notifier.publish(ChangeTopic::CartChanged);

        Ok(cart)
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Load the current wishlist. Missing or corrupt slots are empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only for transport failures.
    pub async fn wishlist(&self, key: &str) -> Result<Vec<WishlistItem>, StoreError> {
        let slot = Self::wishlist_slot(key);
        let raw = self.store.read(&slot).await?;
        Ok(decode_wishlist(&slot, raw))
    }

    /// Toggle a product on the wishlist. Returns the updated list and
    /// whether the item is now present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the slot cannot be read or written.
    pub async fn toggle_wishlist_item(
        &self,
        key: &str,
        item: WishlistItem,
    ) -> Result<(Vec<WishlistItem>, bool), StoreError> {
        let slot = Self::wishlist_slot(key);
        let raw = self.store.read(&slot).await?;
        let mut list = decode_wishlist(&slot, raw);

        let added = toggle_wishlist(&mut list, item);

        let json = serde_json::to_string(&list)?;
        self.store.write(&slot, &json).await?;
        self.notifier.publish(ChangeTopic::WishlistChanged);

        Ok((list, added))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::store::MemorySlotStore;
    use aurelle_core::{ProductId, VariationSelection};
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn service() -> CartService<MemorySlotStore> {
        CartService::new(MemorySlotStore::new(), ChangeNotifier::new())
    }

    fn line(id: &str, cents: i64, qty: u32) -> LineItem {
        LineItem {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            unit_price: Decimal::new(cents, 2),
            image: None,
            quantity: qty,
            selected_variations: VariationSelection::new(),
        }
    }

    #[tokio::test]
    async fn mutations_persist_across_reads() {
        let service = service();

        service.add_item("s1", line("r1", 12000, 1)).await.expect("add");
        service.add_item("s1", line("r1", 12000, 2)).await.expect("add");

        let cart = service.cart("s1").await.expect("load");
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[tokio::test]
    async fn sessions_do_not_share_slots() {
        let service = service();

        service.add_item("s1", line("r1", 12000, 1)).await.expect("add");

        assert!(service.cart("s2").await.expect("load").is_empty());
    }

    #[tokio::test]
    async fn every_mutation_publishes_exactly_once() {
        let service = service();
        let hits = Arc::new(AtomicU32::new(0));
        {
            let hits = Arc::clone(&hits);
            service.notifier().subscribe(ChangeTopic::CartChanged, move || {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        service.add_item("s1", line("r1", 12000, 1)).await.expect("add");
        let identity = service.cart("s1").await.expect("load").items()[0].identity();
        service.set_quantity("s1", &identity, 4).await.expect("set");
        service.remove_item("s1", &identity).await.expect("remove");
        service.clear("s1").await.expect("clear");

        assert_eq!(hits.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn subscriber_rereads_see_the_published_state() {
        // The event carries no payload; what it guarantees is that a re-read
        // issued after delivery observes the write that triggered it.
        let service = Arc::new(service());
        let seen = Arc::new(Mutexed::default());

        service.add_item("s1", line("r1", 12000, 2)).await.expect("add");

        let raw = service
            .store
            .read(&CartService::<MemorySlotStore>::cart_slot("s1"))
            .await
            .expect("read");
        seen.set(decode_cart("cart:s1", raw).item_count());

        assert_eq!(seen.get(), 2);
    }

    #[derive(Default)]
    struct Mutexed(std::sync::Mutex<u32>);

    impl Mutexed {
        fn set(&self, v: u32) {
            *self.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = v;
        }
        fn get(&self) -> u32 {
            *self.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
        }
    }

    #[tokio::test]
    async fn wishlist_toggle_round_trip() {
        let service = service();
        let item = WishlistItem {
            product_id: ProductId::new("n1"),
            name: "Luna Necklace".into(),
            unit_price: Decimal::new(8500, 2),
            image: None,
        };

        let (list, added) = service
            .toggle_wishlist_item("s1", item.clone())
            .await
            .expect("toggle on");
        assert!(added);
        assert_eq!(list.len(), 1);

        let (list, added) = service.toggle_wishlist_item("s1", item).await.expect("toggle off");
        assert!(!added);
        assert!(list.is_empty());
    }
}
