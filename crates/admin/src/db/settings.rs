//! Settings storage: a key/value table of JSON text, with typed accessors
//! for the settings the storefront depends on.

use sqlx::PgPool;

use aurelle_core::ShippingPolicy;

use super::RepositoryError;

/// Settings key holding the shipping policy.
pub const SHIPPING_POLICY_KEY: &str = "shipping_policy";

/// Get a raw setting value.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn get_setting(pool: &PgPool, key: &str) -> Result<Option<String>, RepositoryError> {
    let result: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(result)
}

/// Set a raw setting value.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn set_setting(pool: &PgPool, key: &str, value: &str) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO settings (key, value)
        VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
        ",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the shipping policy, defaulting when unset.
///
/// # Errors
///
/// Returns `DataCorruption` for a malformed stored policy. Unlike the
/// storefront's tolerant read, the admin surface should see the problem.
pub async fn shipping_policy(pool: &PgPool) -> Result<ShippingPolicy, RepositoryError> {
    match get_setting(pool, SHIPPING_POLICY_KEY).await? {
        Some(text) => serde_json::from_str(&text).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid shipping policy setting: {e}"))
        }),
        None => Ok(ShippingPolicy::default()),
    }
}

/// Replace the shipping policy.
///
/// # Errors
///
/// Returns an error if serialization or the database query fails.
pub async fn set_shipping_policy(
    pool: &PgPool,
    policy: &ShippingPolicy,
) -> Result<(), RepositoryError> {
    let text = serde_json::to_string(policy).map_err(|e| {
        RepositoryError::DataCorruption(format!("unserializable shipping policy: {e}"))
    })?;
    set_setting(pool, SHIPPING_POLICY_KEY, &text).await
}
