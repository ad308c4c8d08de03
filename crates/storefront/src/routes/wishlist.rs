//! Wishlist route handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use aurelle_core::{ProductId, WishlistItem};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

use super::slot_key;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/wishlist", get(show))
        .route("/api/wishlist/toggle", post(toggle))
}

#[derive(Debug, Serialize)]
pub struct WishlistView {
    pub items: Vec<WishlistItem>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub product_id: ProductId,
}

#[derive(Debug, Serialize)]
pub struct ToggleView {
    pub items: Vec<WishlistItem>,
    /// Whether the product is on the list after the toggle.
    pub added: bool,
}

/// Display the wishlist.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<WishlistView>> {
    let key = slot_key(&session).await?;
    let items = state.cart().wishlist(&key).await?;
    Ok(Json(WishlistView { items }))
}

/// Add the product if absent, remove it if present.
#[instrument(skip(state, session))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<ToggleView>> {
    let product = ProductRepository::new(state.pool())
        .get_active(&request.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_owned()))?;

    let entry = WishlistItem {
        product_id: product.id,
        name: product.name,
        unit_price: product.base_price,
        image: product.images.first().cloned(),
    };

    let key = slot_key(&session).await?;
    let (items, added) = state.cart().toggle_wishlist_item(&key, entry).await?;
    Ok(Json(ToggleView { items, added }))
}
