//! Database operations for storefront `PostgreSQL`.
//!
//! ## Tables
//!
//! - `users` - Site authentication and the profile used to prefill shipping
//! - `cart_slots` - Named key/value slots holding serialized cart/wishlist lists
//! - `orders` - Orders created at checkout (admin verifies payments)
//! - `products` - Catalog (written by the admin binary, read here)
//! - `design_requests` - Custom-design intake
//! - tower-sessions' own table (created via its `migrate()`)
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p aurelle-cli -- migrate storefront
//! ```

mod design_requests;
mod orders;
mod products;
mod users;

pub use design_requests::{DesignRequest, DesignRequestRepository, NewDesignRequest};
pub use orders::{NewOrder, Order, OrderRepository};
pub use products::{Product, ProductRepository};
pub use users::{Profile, User, UserRepository};

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be decoded into its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Unique-constraint conflict (e.g. duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
