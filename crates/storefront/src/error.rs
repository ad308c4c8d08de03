//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-class errors to
//! Sentry before responding. All route handlers return `Result<T, AppError>`
//! and clients receive a JSON body of the form `{"error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use aurelle_core::CheckoutError;

use crate::cart::StoreError;
use crate::checkout::{SubmitError, SubmitFlowError};
use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::media::MediaError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout gate refused a transition.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Order submission failed.
    #[error("Submit error: {0}")]
    Submit(#[from] SubmitError),

    /// Media host operation failed.
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Cart slot store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Session(_) | Self::Store(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Session(_) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Media(err) => match err {
                MediaError::Rejected(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Submit(err) => match err {
                SubmitError::Rejected(_) => StatusCode::BAD_REQUEST,
                SubmitError::Unavailable(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Checkout(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Session(_) | Self::Store(_) => {
                "Internal server error".to_string()
            }
            Self::Media(err) => match err {
                // The host's own message is the useful part for the customer.
                MediaError::Rejected(msg) => msg.clone(),
                _ => "Media upload failed".to_string(),
            },
            Self::Submit(err) => match err {
                // Surfaced verbatim so the customer can act on it.
                SubmitError::Rejected(msg) => msg.clone(),
                SubmitError::Unavailable(_) => {
                    "Order could not be submitted, please try again".to_string()
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    "Invalid credentials".to_string()
                }
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                _ => "Authentication error".to_string(),
            },
            Self::Checkout(err) => err.to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<SubmitFlowError> for AppError {
    fn from(err: SubmitFlowError) -> Self {
        match err {
            SubmitFlowError::Checkout(e) => Self::Checkout(e),
            SubmitFlowError::Submit(e) => Self::Submit(e),
            SubmitFlowError::Store(e) => Self::Store(e),
            SubmitFlowError::EmptyCart => Self::BadRequest("cart is empty".to_string()),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn status_codes_match_error_classes() {
        assert_eq!(
            status_of(AppError::NotFound("order".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Unauthorized("login required".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::BadRequest("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::Checkout(CheckoutError::MissingPaymentEvidence)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn submission_rejection_surfaces_the_server_message() {
        let err = AppError::Submit(SubmitError::Rejected("card declined".into()));
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }
}
