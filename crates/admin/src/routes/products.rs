//! Catalog management.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;
use tracing::instrument;

use aurelle_core::ProductId;

use crate::db::products::{Product, ProductInput, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/products", get(list).post(create))
        .route(
            "/api/admin/products/{id}",
            get(detail).put(update).delete(archive),
        )
}

#[derive(Debug, Serialize)]
pub struct Archived {
    pub archived: bool,
}

/// All products, archived included.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(ProductRepository::new(state.pool()).list().await?))
}

/// Create a product.
#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    validate(&input)?;
    Ok(Json(ProductRepository::new(state.pool()).create(&input).await?))
}

/// One product.
#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(&ProductId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("product".to_owned()))
}

/// Update a product.
#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    validate(&input)?;
    ProductRepository::new(state.pool())
        .update(&ProductId::new(id), &input)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("product".to_owned()))
}

/// Archive a product (no hard delete once anything may reference it).
#[instrument(skip(state))]
pub async fn archive(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Archived>> {
    let archived = ProductRepository::new(state.pool())
        .archive(&ProductId::new(id))
        .await?;
    if !archived {
        return Err(AppError::NotFound("product".to_owned()));
    }
    Ok(Json(Archived { archived }))
}

fn validate(input: &ProductInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    if input.base_price < rust_decimal::Decimal::ZERO {
        return Err(AppError::BadRequest("base price cannot be negative".into()));
    }
    for group in &input.variations {
        if group.options.is_empty() {
            return Err(AppError::BadRequest(format!(
                "variation group \"{}\" has no options",
                group.title
            )));
        }
    }
    Ok(())
}
