//! Shipping-policy settings.
//!
//! The one storefront-facing setting: the flat fee and the free-shipping
//! threshold the pricing calculator runs on.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use rust_decimal::Decimal;
use tracing::instrument;

use aurelle_core::ShippingPolicy;

use crate::db::settings;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/admin/settings/shipping",
        get(show).put(update),
    )
}

/// Current shipping policy.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ShippingPolicy>> {
    Ok(Json(settings::shipping_policy(state.pool()).await?))
}

/// Replace the shipping policy.
#[instrument(skip(state, policy))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(policy): Json<ShippingPolicy>,
) -> Result<Json<ShippingPolicy>> {
    if policy.standard_shipping_fee < Decimal::ZERO
        || policy.free_shipping_threshold < Decimal::ZERO
    {
        return Err(AppError::BadRequest(
            "fees and thresholds cannot be negative".into(),
        ));
    }

    settings::set_shipping_policy(state.pool(), &policy).await?;
    Ok(Json(policy))
}
