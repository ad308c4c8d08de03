//! Admin route handlers.

pub mod auth;
pub mod design_requests;
pub mod gallery;
pub mod marketing;
pub mod media;
pub mod orders;
pub mod products;
pub mod settings;

use axum::Router;

use crate::state::AppState;

/// Assemble all admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(settings::routes())
        .merge(products::routes())
        .merge(orders::routes())
        .merge(gallery::routes())
        .merge(media::routes())
        .merge(design_requests::routes())
        .merge(marketing::routes())
}
