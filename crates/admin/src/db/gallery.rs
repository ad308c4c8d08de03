//! Gallery and video-carousel storage.
//!
//! Items carry a contiguous `position`; the carousel is always served
//! position-ascending. Reordering is a swap of two items' positions done in
//! one transaction, which is all the drag-free UI needs.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use aurelle_core::GalleryItemId;

use super::RepositoryError;

/// Media kind of a gallery item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GalleryKind {
    Image,
    Video,
}

impl GalleryKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    fn parse(s: &str) -> Result<Self, String> {
        match s {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            other => Err(format!("invalid gallery kind: {other}")),
        }
    }
}

/// One gallery/carousel entry.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GalleryItem {
    pub id: GalleryItemId,
    pub title: String,
    pub media_url: String,
    pub kind: GalleryKind,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct GalleryRow {
    id: String,
    title: String,
    media_url: String,
    kind: String,
    position: i32,
    created_at: DateTime<Utc>,
}

impl GalleryRow {
    fn into_domain(self) -> Result<GalleryItem, RepositoryError> {
        let kind = GalleryKind::parse(&self.kind).map_err(|e| {
            RepositoryError::DataCorruption(format!("gallery item {}: {e}", self.id))
        })?;

        Ok(GalleryItem {
            id: GalleryItemId::new(self.id),
            title: self.title,
            media_url: self.media_url,
            kind,
            position: self.position,
            created_at: self.created_at,
        })
    }
}

/// Repository for gallery operations.
pub struct GalleryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GalleryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List items position-ascending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn list(&self) -> Result<Vec<GalleryItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, GalleryRow>(
            "SELECT id, title, media_url, kind, position, created_at FROM gallery_items ORDER BY position ASC",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(GalleryRow::into_domain).collect()
    }

    /// Append an item at the end of the carousel.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn create(
        &self,
        title: &str,
        media_url: &str,
        kind: GalleryKind,
    ) -> Result<GalleryItem, RepositoryError> {
        let id = Uuid::new_v4().to_string();

        let row = sqlx::query_as::<_, GalleryRow>(
            r"
            INSERT INTO gallery_items (id, title, media_url, kind, position)
            VALUES ($1, $2, $3, $4,
                    (SELECT COALESCE(MAX(position), -1) + 1 FROM gallery_items))
            RETURNING id, title, media_url, kind, position, created_at
            ",
        )
        .bind(&id)
        .bind(title)
        .bind(media_url)
        .bind(kind.as_str())
        .fetch_one(self.pool)
        .await?;

        row.into_domain()
    }

    /// Swap the positions of two items in one transaction.
    ///
    /// # Errors
    ///
    /// `NotFound`-style `Conflict` if either id is unknown.
    pub async fn swap_positions(
        &self,
        first: &GalleryItemId,
        second: &GalleryItemId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let first_pos: Option<i32> =
            sqlx::query_scalar("SELECT position FROM gallery_items WHERE id = $1")
                .bind(first.as_str())
                .fetch_optional(&mut *tx)
                .await?;
        let second_pos: Option<i32> =
            sqlx::query_scalar("SELECT position FROM gallery_items WHERE id = $1")
                .bind(second.as_str())
                .fetch_optional(&mut *tx)
                .await?;

        let (Some(first_pos), Some(second_pos)) = (first_pos, second_pos) else {
            return Err(RepositoryError::Conflict(
                "both gallery items must exist to swap".to_owned(),
            ));
        };

        sqlx::query("UPDATE gallery_items SET position = $2 WHERE id = $1")
            .bind(first.as_str())
            .bind(second_pos)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE gallery_items SET position = $2 WHERE id = $1")
            .bind(second.as_str())
            .bind(first_pos)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn delete(&self, id: &GalleryItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM gallery_items WHERE id = $1")
            .bind(id.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
