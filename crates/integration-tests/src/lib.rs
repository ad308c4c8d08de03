//! Integration tests for Aurelle.
//!
//! These are scenario tests over the library crates: the cart/checkout
//! state model is exercised end to end against the in-memory slot store
//! and stub gateways, with no database or network required.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p aurelle-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - slot round-trips, corruption recovery, change topics
//! - `checkout_flow` - the add-then-checkout scenario and submission
//!   failure/success behavior
//! - `admin_bulk_media` - chunked bulk-upload accounting
