//! Aurelle Storefront library.
//!
//! The public-facing jewelry store as a JSON API: catalog browsing, the
//! cart/wishlist state model, the checkout step machine, account and order
//! history, and custom-design request intake. Exposed as a library so the
//! binary stays thin and the integration-tests crate can exercise the same
//! code without a running server.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
