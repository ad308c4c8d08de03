//! Server-side hosting of the cart state model.
//!
//! The pure model (line items, identity, reconciliation, pricing) lives in
//! `aurelle-core`; this module supplies what the model injects: a slot store
//! for persistence, a change notifier for invalidation signals, and the
//! service that sequences read-modify-write-publish for every mutation.

pub mod notifier;
pub mod service;
pub mod store;

pub use notifier::{ChangeNotifier, ChangeTopic, SubscriptionId};
pub use service::CartService;
pub use store::{MemorySlotStore, PgSlotStore, SlotStore, StoreError};
