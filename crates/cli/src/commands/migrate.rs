//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for storefront
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for admin
//!
//! Both typically point at the same database; the split exists so the two
//! binaries can be credentialed separately.

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors from migration commands.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

async fn connect(var: &'static str) -> Result<PgPool, MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var(var)
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar(var))?;

    aurelle_admin::db::create_pool(&database_url)
        .await
        .map_err(MigrationError::Database)
}

/// Run storefront migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn storefront() -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect("STOREFRONT_DATABASE_URL").await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;
    tracing::info!("Storefront migrations complete");

    Ok(())
}

/// Run admin migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn admin() -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect("ADMIN_DATABASE_URL").await?;

    tracing::info!("Running admin migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;
    tracing::info!("Admin migrations complete");

    Ok(())
}

/// Run all migrations.
///
/// # Errors
///
/// Returns the first failure.
pub async fn all() -> Result<(), Box<dyn std::error::Error>> {
    storefront().await?;
    admin().await
}
