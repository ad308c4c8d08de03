//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars)
//! - `MEDIA_API_URL` - Base URL of the external media host
//! - `MEDIA_API_KEY` - API key for the media host
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// External media host configuration
    pub media: MediaConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// External media host configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct MediaConfig {
    /// Base URL of the media host API
    pub api_url: String,
    /// API key (server-side only)
    pub api_key: SecretString,
}

impl std::fmt::Debug for MediaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the session secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_required_env("STOREFRONT_DATABASE_URL").map(SecretString::from)?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let session_secret = get_validated_secret("STOREFRONT_SESSION_SECRET")?;

        let media = MediaConfig {
            api_url: get_url("MEDIA_API_URL")?,
            api_key: get_required_env("MEDIA_API_KEY").map(SecretString::from)?,
        };

        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            media,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Get an environment variable or a default value.
fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get an optional environment variable.
fn get_optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Get a required environment variable that must parse as a URL.
fn get_url(name: &str) -> Result<String, ConfigError> {
    let value = get_required_env(name)?;
    url::Url::parse(&value)
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))?;
    Ok(value)
}

/// Get a secret, rejecting obvious placeholders and short values.
fn get_validated_secret(name: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(name)?;

    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            name.to_string(),
            format!("must be at least {MIN_SESSION_SECRET_LENGTH} characters"),
        ));
    }

    let lowered = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lowered.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                name.to_string(),
                format!("looks like a placeholder (contains \"{pattern}\")"),
            ));
        }
    }

    let secret = SecretString::from(value);
    debug_assert!(!secret.expose_secret().is_empty());
    Ok(secret)
}

#[cfg(test)]
#[allow(unsafe_code)] // tests mutate the process environment
mod tests {
    use super::*;

    #[test]
    fn short_secrets_are_rejected() {
        // SAFETY: tests run single-threaded per process start; mutating the
        // environment here does not race other tests in this module.
        unsafe { std::env::set_var("TEST_SECRET_SHORT", "tiny") };
        assert!(matches!(
            get_validated_secret("TEST_SECRET_SHORT"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn placeholder_secrets_are_rejected() {
        unsafe {
            std::env::set_var(
                "TEST_SECRET_PLACEHOLDER",
                "changeme-changeme-changeme-changeme",
            );
        };
        assert!(matches!(
            get_validated_secret("TEST_SECRET_PLACEHOLDER"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn strong_secrets_pass() {
        unsafe {
            std::env::set_var(
                "TEST_SECRET_STRONG",
                "kXf2hA91mZq7LpB4vW8cRn3TyG6dJs5e",
            );
        };
        assert!(get_validated_secret("TEST_SECRET_STRONG").is_ok());
    }
}
