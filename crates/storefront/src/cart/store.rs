//! The persistent store adapter: named text slots for serialized state.
//!
//! A slot holds one JSON-serialized list (`cart:{key}` holds line items,
//! `wishlist:{key}` holds wishlist entries). Reads of a missing or
//! malformed slot yield the empty list; corruption is logged and
//! swallowed, never raised to the caller. Writes replace the whole value;
//! there is no partial-write protection and the last write wins. Mutation
//! discipline is read-modify-write of the full list, which is safe because
//! each session's requests touch its slots one handler at a time.

use std::collections::HashMap;
use std::sync::Mutex;

use sqlx::PgPool;
use thiserror::Error;

use aurelle_core::{Cart, WishlistItem};

/// Errors from the slot store transport. Decode failures are not errors;
/// they fall back to the empty value by contract.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("slot store database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("slot store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A named slot of durable text.
pub trait SlotStore: Send + Sync {
    /// Read a slot's raw value, `None` if the slot has never been written.
    fn read(&self, slot: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Overwrite a slot's value.
    fn write(&self, slot: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove a slot entirely.
    fn remove(&self, slot: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Decode a slot's text into a cart, falling back to empty on corruption.
pub(crate) fn decode_cart(slot: &str, raw: Option<String>) -> Cart {
    raw.map_or_else(Cart::new, |text| {
        serde_json::from_str(&text).unwrap_or_else(|e| {
            tracing::warn!(slot, error = %e, "discarding malformed cart slot");
            Cart::new()
        })
    })
}

/// Decode a slot's text into a wishlist, falling back to empty on corruption.
pub(crate) fn decode_wishlist(slot: &str, raw: Option<String>) -> Vec<WishlistItem> {
    raw.map_or_else(Vec::new, |text| {
        serde_json::from_str(&text).unwrap_or_else(|e| {
            tracing::warn!(slot, error = %e, "discarding malformed wishlist slot");
            Vec::new()
        })
    })
}

// =============================================================================
// PostgreSQL-backed store
// =============================================================================

/// Slot store over the `cart_slots` table.
#[derive(Clone)]
pub struct PgSlotStore {
    pool: PgPool,
}

impl PgSlotStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SlotStore for PgSlotStore {
    async fn read(&self, slot: &str) -> Result<Option<String>, StoreError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM cart_slots WHERE slot = $1")
                .bind(slot)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    async fn write(&self, slot: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO cart_slots (slot, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (slot) DO UPDATE SET value = $2, updated_at = NOW()
            ",
        )
        .bind(slot)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, slot: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM cart_slots WHERE slot = $1")
            .bind(slot)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// In-memory store (tests, and the injectable-store seam)
// =============================================================================

/// In-memory slot store. Lets tests instantiate isolated stores instead of
/// sharing one global, and doubles as the reference implementation of the
/// slot contract.
#[derive(Default)]
pub struct MemorySlotStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySlotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a slot with raw text, bypassing serialization. Used by tests to
    /// simulate corrupted storage.
    pub fn seed_raw(&self, slot: &str, value: &str) {
        let mut slots = self.slots.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        slots.insert(slot.to_owned(), value.to_owned());
    }
}

impl SlotStore for MemorySlotStore {
    async fn read(&self, slot: &str) -> Result<Option<String>, StoreError> {
        let slots = self.slots.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(slots.get(slot).cloned())
    }

    async fn write(&self, slot: &str, value: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        slots.insert(slot.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, slot: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        slots.remove(slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurelle_core::{LineItem, ProductId, VariationSelection};
    use rust_decimal::Decimal;

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_or_increment(LineItem {
            product_id: ProductId::new("r1"),
            name: "Aurora Ring".into(),
            unit_price: Decimal::new(12000, 2),
            image: Some("https://cdn.example/r1.jpg".into()),
            quantity: 2,
            selected_variations: VariationSelection::new(),
        });
        cart
    }

    #[tokio::test]
    async fn round_trip_preserves_the_list() {
        let store = MemorySlotStore::new();
        let cart = sample_cart();

        let json = serde_json::to_string(&cart).expect("serialize");
        store.write("cart:s1", &json).await.expect("write");

        let raw = store.read("cart:s1").await.expect("read");
        assert_eq!(decode_cart("cart:s1", raw), cart);
    }

    #[tokio::test]
    async fn missing_slot_reads_as_empty() {
        let store = MemorySlotStore::new();
        let raw = store.read("cart:never-written").await.expect("read");
        assert!(decode_cart("cart:never-written", raw).is_empty());
    }

    #[tokio::test]
    async fn corrupted_slot_reads_as_empty_not_error() {
        let store = MemorySlotStore::new();
        store.seed_raw("cart:s1", "not json");

        let raw = store.read("cart:s1").await.expect("read");
        assert!(decode_cart("cart:s1", raw).is_empty());
    }

    #[tokio::test]
    async fn unknown_fields_in_stored_items_are_tolerated() {
        // A slot written by a newer build may carry fields this one doesn't
        // know about; they must not poison the load.
        let store = MemorySlotStore::new();
        store.seed_raw(
            "cart:s1",
            r#"[{"product_id":"r1","name":"Aurora Ring","unit_price":"120.00",
                 "quantity":1,"engraving":"forever"}]"#,
        );

        let raw = store.read("cart:s1").await.expect("read");
        let cart = decode_cart("cart:s1", raw);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[tokio::test]
    async fn remove_clears_the_slot() {
        let store = MemorySlotStore::new();
        store.write("wishlist:s1", "[]").await.expect("write");
        store.remove("wishlist:s1").await.expect("remove");
        assert!(store.read("wishlist:s1").await.expect("read").is_none());
    }
}
