//! Storefront-facing read of admin-configured settings.
//!
//! The shipping policy is read from the shared settings table and cached
//! briefly, so one checkout session sees one policy rather than a fresh
//! read per pricing call.

use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use aurelle_core::ShippingPolicy;

/// Settings key holding the shipping policy JSON.
const SHIPPING_POLICY_KEY: &str = "shipping_policy";

/// Cache TTL. Long enough to cover a checkout, short enough that admin
/// changes land without a deploy.
const POLICY_TTL: Duration = Duration::from_secs(60);

/// Cached reader for storefront-visible settings.
#[derive(Clone)]
pub struct SettingsReader {
    pool: PgPool,
    cache: Cache<&'static str, ShippingPolicy>,
}

impl SettingsReader {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(POLICY_TTL)
            .build();

        Self { pool, cache }
    }

    /// The current shipping policy.
    ///
    /// A missing or malformed setting falls back to the default policy
    /// (no fee, no threshold) with a warning; checkout must not break
    /// because configuration is absent.
    pub async fn shipping_policy(&self) -> ShippingPolicy {
        if let Some(policy) = self.cache.get(&SHIPPING_POLICY_KEY).await {
            return policy;
        }

        let policy = self.load_policy().await;
        self.cache.insert(SHIPPING_POLICY_KEY, policy.clone()).await;
        policy
    }

    async fn load_policy(&self) -> ShippingPolicy {
        let raw: Result<Option<String>, sqlx::Error> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = $1")
                .bind(SHIPPING_POLICY_KEY)
                .fetch_optional(&self.pool)
                .await;

        match raw {
            Ok(Some(text)) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "malformed shipping policy setting, using default");
                ShippingPolicy::default()
            }),
            Ok(None) => ShippingPolicy::default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read shipping policy, using default");
                ShippingPolicy::default()
            }
        }
    }
}
