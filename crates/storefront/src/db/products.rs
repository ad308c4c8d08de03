//! Product catalog reads.
//!
//! The catalog is written by the admin binary; the storefront only reads.
//! Image lists and variation groups are JSON text decoded here into the
//! core types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use aurelle_core::{ProductId, ProductStatus, VariationGroup};

use super::RepositoryError;

/// A catalog product as the storefront sees it.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Decimal,
    pub images: Vec<String>,
    pub variations: Vec<VariationGroup>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    description: String,
    category: String,
    base_price: Decimal,
    images: String,
    variations: String,
    created_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_domain(self) -> Result<Product, RepositoryError> {
        let images: Vec<String> = serde_json::from_str(&self.images).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid images on product {}: {e}", self.id))
        })?;
        let variations: Vec<VariationGroup> =
            serde_json::from_str(&self.variations).map_err(|e| {
                RepositoryError::DataCorruption(format!(
                    "invalid variations on product {}: {e}",
                    self.id
                ))
            })?;

        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            description: self.description,
            category: self.category,
            base_price: self.base_price,
            images,
            variations,
            created_at: self.created_at,
        })
    }
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, category, base_price, images, variations, created_at";

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products, newest first, optionally filtered by category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn list_active(
        &self,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = match category {
            Some(category) => {
                sqlx::query_as::<_, ProductRow>(&format!(
                    r"
                    SELECT {PRODUCT_COLUMNS} FROM products
                    WHERE status = $1 AND category = $2
                    ORDER BY created_at DESC LIMIT $3 OFFSET $4
                    ",
                ))
                .bind(ProductStatus::Active.to_string())
                .bind(category)
                .bind(limit)
                .bind(offset)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ProductRow>(&format!(
                    r"
                    SELECT {PRODUCT_COLUMNS} FROM products
                    WHERE status = $1
                    ORDER BY created_at DESC LIMIT $2 OFFSET $3
                    ",
                ))
                .bind(ProductStatus::Active.to_string())
                .bind(limit)
                .bind(offset)
                .fetch_all(self.pool)
                .await?
            }
        };

        rows.into_iter().map(ProductRow::into_domain).collect()
    }

    /// Fetch an active product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn get_active(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND status = $2",
        ))
        .bind(id.as_str())
        .bind(ProductStatus::Active.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_domain).transpose()
    }
}
