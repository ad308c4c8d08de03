//! Catalog writes: product CRUD with open variation groups.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use aurelle_core::{ProductId, ProductStatus, VariationGroup};

use super::RepositoryError;

/// A catalog product as the back-office sees it (archived ones included).
#[derive(Debug, Clone, serde::Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Decimal,
    pub images: Vec<String>,
    pub variations: Vec<VariationGroup>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable product fields.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Decimal,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub variations: Vec<VariationGroup>,
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
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, category, base_price, images, variations, status, created_at, updated_at";

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
        let status = self.status.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("product {}: {e}", self.id))
        })?;

        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            description: self.description,
            category: self.category,
            base_price: self.base_price,
            images,
            variations,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn encode_input(input: &ProductInput) -> Result<(String, String), RepositoryError> {
    let images = serde_json::to_string(&input.images)
        .map_err(|e| RepositoryError::DataCorruption(format!("unserializable images: {e}")))?;
    let variations = serde_json::to_string(&input.variations)
        .map_err(|e| RepositoryError::DataCorruption(format!("unserializable variations: {e}")))?;
    Ok((images, variations))
}

/// Repository for catalog writes.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC",
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_domain).collect()
    }

    /// Fetch a product by id, archived or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn get(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1",
        ))
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_domain).transpose()
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let id = Uuid::new_v4().to_string();
        let (images, variations) = encode_input(input)?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO products
                (id, name, description, category, base_price, images, variations, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            ",
        ))
        .bind(&id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category)
        .bind(input.base_price)
        .bind(&images)
        .bind(&variations)
        .bind(ProductStatus::Active.to_string())
        .fetch_one(self.pool)
        .await?;

        row.into_domain()
    }

    /// Update a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn update(
        &self,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<Option<Product>, RepositoryError> {
        let (images, variations) = encode_input(input)?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE products
            SET name = $2, description = $3, category = $4, base_price = $5,
                images = $6, variations = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            ",
        ))
        .bind(id.as_str())
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category)
        .bind(input.base_price)
        .bind(&images)
        .bind(&variations)
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_domain).transpose()
    }

    /// Archive a product. Ordered products stay resolvable for history, so
    /// there is no hard delete.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn archive(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_str())
        .bind(ProductStatus::Archived.to_string())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
