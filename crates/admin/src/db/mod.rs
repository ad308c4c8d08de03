//! Database operations for the admin `PostgreSQL`.
//!
//! The admin binary owns the write side of the shared database: the
//! catalog, settings, gallery, media registry, email templates, and admin
//! users. Orders and design requests are created by the storefront and
//! managed here.
//!
//! # Migrations
//!
//! Migrations live in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p aurelle-cli -- migrate admin
//! ```

pub mod admin_users;
pub mod design_requests;
pub mod email_templates;
pub mod gallery;
pub mod media;
pub mod orders;
pub mod products;
pub mod settings;

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

    /// Unique-constraint conflict or an update refused by a state guard.
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
