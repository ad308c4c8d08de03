//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use crate::config::AdminConfig;
use crate::services::email::EmailService;
use crate::services::media::{MediaClient, MediaError};

/// Error building the application state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("media client error: {0}")]
    Media(#[from] MediaError),
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    media: MediaClient,
    email: EmailService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the media client or SMTP relay cannot be built.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, StateError> {
        let media = MediaClient::new(&config.media)?;
        let email = EmailService::new(&config.email)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                media,
                email,
            }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the media host client.
    #[must_use]
    pub fn media(&self) -> &MediaClient {
        &self.inner.media
    }

    /// Get a reference to the email service.
    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }
}
