//! Authentication route handlers.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::Result;
use crate::models::{CurrentUser, session_keys};
use crate::services::auth;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub user: CurrentUser,
}

#[derive(Debug, Serialize)]
pub struct LoggedOut {
    pub logged_out: bool,
}

/// Create an account and log it in.
#[instrument(skip(state, session, request))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<SessionView>> {
    let repo = UserRepository::new(state.pool());
    let user = auth::register(&repo, &request.email, &request.password).await?;

    let current = CurrentUser {
        id: user.id,
        email: user.email,
    };
    session.insert(session_keys::CURRENT_USER, &current).await?;

    Ok(Json(SessionView { user: current }))
}

/// Verify credentials and start a session.
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<SessionView>> {
    let repo = UserRepository::new(state.pool());
    let user = auth::login(&repo, &request.email, &request.password).await?;

    let current = CurrentUser {
        id: user.id,
        email: user.email,
    };
    session.insert(session_keys::CURRENT_USER, &current).await?;

    Ok(Json(SessionView { user: current }))
}

/// End the session. The cart slot key goes with it by design: carts are
/// session-scoped, not account-scoped.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<LoggedOut>> {
    session.flush().await?;
    Ok(Json(LoggedOut { logged_out: true }))
}
