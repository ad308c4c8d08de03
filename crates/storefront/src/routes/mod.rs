//! Storefront route handlers.

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod design;
pub mod products;
pub mod wishlist;

use axum::Router;
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::Result;
use crate::models::session_keys;
use crate::state::AppState;

/// Assemble all storefront routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(products::routes())
        .merge(cart::routes())
        .merge(wishlist::routes())
        .merge(checkout::routes())
        .merge(account::routes())
        .merge(auth::routes())
        .merge(design::routes())
}

/// The stable key naming this session's cart/wishlist slots.
///
/// Created on first use and kept for the session's lifetime, so the slots
/// survive login/logout within the same browser session.
pub(crate) async fn slot_key(session: &Session) -> Result<String> {
    if let Some(key) = session.get::<String>(session_keys::SLOT_KEY).await? {
        return Ok(key);
    }

    let key = Uuid::new_v4().to_string();
    session.insert(session_keys::SLOT_KEY, &key).await?;
    Ok(key)
}
