//! Order review and payment verification.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use serde::Deserialize;
use tracing::instrument;

use aurelle_core::{OrderId, OrderStatus, PaymentStatus};

use crate::db::orders::{Order, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/orders", get(list))
        .route("/api/admin/orders/{id}", get(detail))
        .route("/api/admin/orders/{id}/status", put(set_status))
        .route("/api/admin/orders/{id}/payment/verify", post(verify_payment))
        .route("/api/admin/orders/{id}/payment/reject", post(reject_payment))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

/// Orders, newest first, optionally filtered by payment status.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(
        OrderRepository::new(state.pool())
            .list(query.payment_status)
            .await?,
    ))
}

/// One order.
#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    OrderRepository::new(state.pool())
        .get(&OrderId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("order".to_owned()))
}

/// Set the fulfillment status.
#[instrument(skip(state))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<Order>> {
    OrderRepository::new(state.pool())
        .set_order_status(&OrderId::new(id), request.status)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("order".to_owned()))
}

/// Verify the payment evidence and confirm the order. The customer is told
/// by email; a failed send is logged, not fatal, and the verification stands.
#[instrument(skip(state))]
pub async fn verify_payment(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let order = resolve(&state, &id, PaymentStatus::Verified).await?;

    if let Err(e) = state
        .email()
        .send_payment_verified(&order.customer.email, order.id.as_str())
        .await
    {
        tracing::warn!(order_id = %order.id, error = %e, "verification email failed");
    }

    Ok(Json(order))
}

/// Reject the payment evidence, re-opening the customer's resubmission
/// path. Same email posture as verification.
#[instrument(skip(state))]
pub async fn reject_payment(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let order = resolve(&state, &id, PaymentStatus::Rejected).await?;

    if let Err(e) = state
        .email()
        .send_payment_rejected(&order.customer.email, order.id.as_str())
        .await
    {
        tracing::warn!(order_id = %order.id, error = %e, "rejection email failed");
    }

    Ok(Json(order))
}

async fn resolve(state: &AppState, id: &str, verdict: PaymentStatus) -> Result<Order> {
    OrderRepository::new(state.pool())
        .resolve_payment(&OrderId::new(id), verdict)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::Conflict(msg) => AppError::BadRequest(msg),
            other => AppError::Database(other),
        })
}
