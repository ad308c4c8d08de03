//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cart::{CartService, ChangeNotifier, PgSlotStore};
use crate::config::StorefrontConfig;
use crate::services::media::{MediaClient, MediaError};
use crate::services::settings::SettingsReader;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; provides access to shared resources like
/// the database pool, the cart service, and the media host client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    cart: CartService<PgSlotStore>,
    media: MediaClient,
    settings: SettingsReader,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the media host client cannot be constructed.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, MediaError> {
        let media = MediaClient::new(&config.media)?;
        let cart = CartService::new(PgSlotStore::new(pool.clone()), ChangeNotifier::new());
        let settings = SettingsReader::new(pool.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                cart,
                media,
                settings,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the cart/wishlist service.
    #[must_use]
    pub fn cart(&self) -> &CartService<PgSlotStore> {
        &self.inner.cart
    }

    /// Get a reference to the media host client.
    #[must_use]
    pub fn media(&self) -> &MediaClient {
        &self.inner.media
    }

    /// Get a reference to the cached settings reader.
    #[must_use]
    pub fn settings(&self) -> &SettingsReader {
        &self.inner.settings
    }
}
