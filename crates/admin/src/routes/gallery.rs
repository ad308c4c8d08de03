//! Gallery / video-carousel management.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use aurelle_core::GalleryItemId;

use crate::db::gallery::{GalleryItem, GalleryKind, GalleryRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/gallery", get(list).post(create))
        .route("/api/admin/gallery/swap", post(swap))
        .route("/api/admin/gallery/{id}", delete(remove))
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub title: String,
    pub media_url: String,
    pub kind: GalleryKind,
}

#[derive(Debug, Deserialize)]
pub struct SwapRequest {
    pub first_id: GalleryItemId,
    pub second_id: GalleryItemId,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

/// Carousel items, position-ascending.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<GalleryItem>>> {
    Ok(Json(GalleryRepository::new(state.pool()).list().await?))
}

/// Append an item at the end of the carousel.
#[instrument(skip(state, request))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(request): Json<CreateRequest>,
) -> Result<Json<GalleryItem>> {
    if request.media_url.trim().is_empty() {
        return Err(AppError::BadRequest("media_url is required".into()));
    }

    let item = GalleryRepository::new(state.pool())
        .create(&request.title, &request.media_url, request.kind)
        .await?;
    Ok(Json(item))
}

/// Swap two items' positions, then return the reordered list.
#[instrument(skip(state))]
pub async fn swap(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(request): Json<SwapRequest>,
) -> Result<Json<Vec<GalleryItem>>> {
    if request.first_id == request.second_id {
        return Err(AppError::BadRequest("cannot swap an item with itself".into()));
    }

    let repo = GalleryRepository::new(state.pool());
    repo.swap_positions(&request.first_id, &request.second_id)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::Conflict(msg) => AppError::BadRequest(msg),
            other => AppError::Database(other),
        })?;

    Ok(Json(repo.list().await?))
}

/// Remove an item.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Deleted>> {
    let deleted = GalleryRepository::new(state.pool())
        .delete(&GalleryItemId::new(id))
        .await?;
    if !deleted {
        return Err(AppError::NotFound("gallery item".to_owned()));
    }
    Ok(Json(Deleted { deleted }))
}
