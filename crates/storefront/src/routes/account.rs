//! Account route handlers: profile, order history, and payment-evidence
//! resubmission.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    routing::{get, patch},
};
use tracing::instrument;

use aurelle_core::OrderId;

use crate::db::{Order, OrderRepository, Profile, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

const PAYMENT_PROOF_FOLDER: &str = "payment-proofs";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/account/profile", get(profile).put(update_profile))
        .route("/api/account/orders", get(orders))
        .route("/api/account/orders/{id}", get(order_detail))
        .route("/api/account/orders/{id}/payment", patch(resubmit_payment))
}

/// Fetch the saved profile used to prefill shipping.
#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Profile>> {
    let profile = UserRepository::new(state.pool())
        .profile(&user.id)
        .await?
        .unwrap_or_default();
    Ok(Json(profile))
}

/// Update the saved profile.
#[instrument(skip(state, update))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(update): Json<Profile>,
) -> Result<Json<Profile>> {
    let repo = UserRepository::new(state.pool());
    repo.update_profile(&user.id, &update).await?;
    Ok(Json(update))
}

/// Order history, newest first.
#[instrument(skip(state))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(&user.id)
        .await?;
    Ok(Json(orders))
}

/// A single order.
#[instrument(skip(state))]
pub async fn order_detail(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get_for_user(&OrderId::new(id), &user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_owned()))?;
    Ok(Json(order))
}

/// Upload new payment evidence for a rejected order.
///
/// This path bypasses the step machine entirely: the order already exists,
/// only its evidence changes.
#[instrument(skip(state, multipart))]
pub async fn resubmit_payment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Order>> {
    let mut uploaded = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed upload: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("payment-proof").to_owned();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("malformed upload: {e}")))?;

            uploaded = Some(
                state
                    .media()
                    .upload(&filename, &content_type, bytes.to_vec(), PAYMENT_PROOF_FOLDER)
                    .await?,
            );
        }
    }

    let uploaded =
        uploaded.ok_or_else(|| AppError::BadRequest("missing \"file\" field".into()))?;

    let order = OrderRepository::new(state.pool())
        .resubmit_payment_proof(&OrderId::new(id), &user.id, &uploaded.url)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::Conflict(msg) => AppError::BadRequest(msg),
            other => AppError::Database(other),
        })?;

    Ok(Json(order))
}
