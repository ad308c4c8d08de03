//! Admin authentication.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use aurelle_core::Email;

use crate::db::admin_users::AdminUserRepository;
use crate::error::{AppError, Result};
use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/auth/login", post(login))
        .route("/api/admin/auth/logout", post(logout))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub admin: CurrentAdmin,
}

#[derive(Debug, Serialize)]
pub struct LoggedOut {
    pub logged_out: bool,
}

/// Verify admin credentials and start a session.
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionView>> {
    let email = Email::parse(&request.email)
        .map_err(|_| AppError::Unauthorized("invalid credentials".into()))?;

    let admin = AdminUserRepository::new(state.pool())
        .get_by_email(&email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid credentials".into()))?;

    let parsed_hash = PasswordHash::new(&admin.password_hash)
        .map_err(|_| AppError::Unauthorized("invalid credentials".into()))?;
    Argon2::default()
        .verify_password(request.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("invalid credentials".into()))?;

    let current = CurrentAdmin {
        id: admin.id,
        email: admin.email,
        name: admin.name,
        role: admin.role,
    };
    session.insert(session_keys::CURRENT_ADMIN, &current).await?;

    Ok(Json(SessionView { admin: current }))
}

/// End the admin session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<LoggedOut>> {
    session.flush().await?;
    Ok(Json(LoggedOut { logged_out: true }))
}
