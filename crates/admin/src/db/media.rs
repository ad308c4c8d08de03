//! Registry of uploaded media assets.
//!
//! The bytes live on the external media host; this table records what was
//! uploaded where, so the library page can list and delete.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use aurelle_core::MediaAssetId;

use super::RepositoryError;

/// One registered media asset.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MediaAsset {
    pub id: MediaAssetId,
    /// Id assigned by the media host, needed to delete remotely.
    pub remote_id: String,
    pub url: String,
    pub folder: String,
    pub filename: String,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct MediaRow {
    id: String,
    remote_id: String,
    url: String,
    folder: String,
    filename: String,
    content_type: String,
    created_at: DateTime<Utc>,
}

impl MediaRow {
    fn into_domain(self) -> MediaAsset {
        MediaAsset {
            id: MediaAssetId::new(self.id),
            remote_id: self.remote_id,
            url: self.url,
            folder: self.folder,
            filename: self.filename,
            content_type: self.content_type,
            created_at: self.created_at,
        }
    }
}

/// Repository for the media registry.
pub struct MediaRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MediaRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List assets, newest first, optionally by folder.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn list(&self, folder: Option<&str>) -> Result<Vec<MediaAsset>, RepositoryError> {
        let rows = match folder {
            Some(folder) => {
                sqlx::query_as::<_, MediaRow>(
                    r"
                    SELECT id, remote_id, url, folder, filename, content_type, created_at
                    FROM media_assets WHERE folder = $1 ORDER BY created_at DESC
                    ",
                )
                .bind(folder)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, MediaRow>(
                    r"
                    SELECT id, remote_id, url, folder, filename, content_type, created_at
                    FROM media_assets ORDER BY created_at DESC
                    ",
                )
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(MediaRow::into_domain).collect())
    }

    /// Record a completed upload.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn register(
        &self,
        remote_id: &str,
        url: &str,
        folder: &str,
        filename: &str,
        content_type: &str,
    ) -> Result<MediaAsset, RepositoryError> {
        let id = Uuid::new_v4().to_string();

        let row = sqlx::query_as::<_, MediaRow>(
            r"
            INSERT INTO media_assets (id, remote_id, url, folder, filename, content_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, remote_id, url, folder, filename, content_type, created_at
            ",
        )
        .bind(&id)
        .bind(remote_id)
        .bind(url)
        .bind(folder)
        .bind(filename)
        .bind(content_type)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into_domain())
    }

    /// Fetch an asset by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn get(&self, id: &MediaAssetId) -> Result<Option<MediaAsset>, RepositoryError> {
        let row = sqlx::query_as::<_, MediaRow>(
            r"
            SELECT id, remote_id, url, folder, filename, content_type, created_at
            FROM media_assets WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(MediaRow::into_domain))
    }

    /// Drop an asset from the registry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn delete(&self, id: &MediaAssetId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM media_assets WHERE id = $1")
            .bind(id.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
