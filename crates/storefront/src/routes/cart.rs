//! Cart route handlers.
//!
//! Prices on cart lines are always computed server-side from the catalog;
//! the client only names the product, the chosen variations, and a
//! quantity.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use aurelle_core::{
    Cart, ItemIdentity, LineItem, PricingBreakdown, ProductId, VariationSelection,
    selection_price,
};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

use super::slot_key;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/cart", get(show))
        .route(
            "/api/cart/items",
            post(add).put(update_quantity).delete(remove),
        )
        .route("/api/cart/clear", post(clear))
        .route("/api/cart/count", get(count))
}

/// Cart plus its pricing under the current shipping policy.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Cart,
    pub item_count: u32,
    pub pricing: PricingBreakdown,
}

impl CartView {
    async fn build(state: &AppState, cart: Cart) -> Self {
        let policy = state.settings().shipping_policy().await;
        Self {
            item_count: cart.item_count(),
            pricing: PricingBreakdown::quote(&cart, &policy),
            items: cart,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub selected_variations: VariationSelection,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub selected_variations: VariationSelection,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub selected_variations: VariationSelection,
}

#[derive(Debug, Serialize)]
pub struct CountView {
    pub count: u32,
}

/// Display the cart with its pricing breakdown.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let key = slot_key(&session).await?;
    let cart = state.cart().cart(&key).await?;
    Ok(Json(CartView::build(&state, cart).await))
}

/// Add an item (or increment the matching line).
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    if request.quantity < 1 {
        return Err(AppError::BadRequest("quantity must be at least 1".into()));
    }

    let product = ProductRepository::new(state.pool())
        .get_active(&request.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_owned()))?;

    let unit_price = selection_price(
        product.base_price,
        &product.variations,
        &request.selected_variations,
    )
    .ok_or_else(|| AppError::BadRequest("unknown variation selection".into()))?;

    let item = LineItem {
        product_id: product.id,
        name: product.name,
        unit_price,
        image: product.images.first().cloned(),
        quantity: request.quantity,
        selected_variations: request.selected_variations,
    };

    let key = slot_key(&session).await?;
    let cart = state.cart().add_item(&key, item).await?;
    Ok(Json(CartView::build(&state, cart).await))
}

/// Replace a line's quantity. Quantities below 1 leave the cart unchanged.
#[instrument(skip(state, session))]
pub async fn update_quantity(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let identity = ItemIdentity::new(request.product_id, request.selected_variations);

    let key = slot_key(&session).await?;
    let cart = state
        .cart()
        .set_quantity(&key, &identity, request.quantity)
        .await?;
    Ok(Json(CartView::build(&state, cart).await))
}

/// Remove a line.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RemoveItemRequest>,
) -> Result<Json<CartView>> {
    let identity = ItemIdentity::new(request.product_id, request.selected_variations);

    let key = slot_key(&session).await?;
    let cart = state.cart().remove_item(&key, &identity).await?;
    Ok(Json(CartView::build(&state, cart).await))
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let key = slot_key(&session).await?;
    let cart = state.cart().clear(&key).await?;
    Ok(Json(CartView::build(&state, cart).await))
}

/// Unit count for the header badge.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<Json<CountView>> {
    let key = slot_key(&session).await?;
    let cart = state.cart().cart(&key).await?;
    Ok(Json(CountView {
        count: cart.item_count(),
    }))
}
