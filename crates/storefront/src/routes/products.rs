//! Catalog route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use aurelle_core::{CurrencyCode, Price, ProductId, price_range};

use crate::db::{Product, ProductRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

const PAGE_SIZE: i64 = 24;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list))
        .route("/api/products/{id}", get(detail))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub page: Option<u32>,
}

/// Displayed price range across a product's variation choices.
#[derive(Debug, Serialize)]
pub struct PriceRangeView {
    pub min: Decimal,
    pub max: Decimal,
    /// Ready-to-render label, e.g. "$100.00" or "$100.00 - $350.00".
    pub display: String,
}

#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price_range: PriceRangeView,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub price_range: PriceRangeView,
}

fn range_view(product: &Product) -> PriceRangeView {
    let (min, max) = price_range(product.base_price, &product.variations);
    let display = if min == max {
        Price::new(min, CurrencyCode::USD).to_string()
    } else {
        format!(
            "{} - {}",
            Price::new(min, CurrencyCode::USD),
            Price::new(max, CurrencyCode::USD)
        )
    };
    PriceRangeView { min, max, display }
}

/// List active products, paged, optionally by category.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProductSummary>>> {
    let page = i64::from(query.page.unwrap_or(0));
    let products = ProductRepository::new(state.pool())
        .list_active(query.category.as_deref(), PAGE_SIZE, page * PAGE_SIZE)
        .await?;

    let summaries = products
        .into_iter()
        .map(|product| ProductSummary {
            price_range: range_view(&product),
            image: product.images.first().cloned(),
            id: product.id,
            name: product.name,
            category: product.category,
        })
        .collect();

    Ok(Json(summaries))
}

/// Product detail, including variation groups and the aggregated range.
#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductDetail>> {
    let product = ProductRepository::new(state.pool())
        .get_active(&ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_owned()))?;

    Ok(Json(ProductDetail {
        price_range: range_view(&product),
        product,
    }))
}
