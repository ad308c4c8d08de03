//! Design-request triage.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use aurelle_core::{DesignRequestId, DesignRequestStatus, UserId};

use super::RepositoryError;

/// A design request as the back-office sees it.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DesignRequest {
    pub id: DesignRequestId,
    pub user_id: Option<UserId>,
    pub name: String,
    pub email: String,
    pub jewelry_types: Vec<String>,
    pub description: Option<String>,
    pub budget: Option<String>,
    pub reference_image_url: Option<String>,
    pub status: DesignRequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct DesignRequestRow {
    id: String,
    user_id: Option<String>,
    name: String,
    email: String,
    jewelry_types: String,
    description: Option<String>,
    budget: Option<String>,
    reference_image_url: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

const DESIGN_REQUEST_COLUMNS: &str = "id, user_id, name, email, jewelry_types, description, \
     budget, reference_image_url, status, created_at";

impl DesignRequestRow {
    fn into_domain(self) -> Result<DesignRequest, RepositoryError> {
        let jewelry_types: Vec<String> =
            serde_json::from_str(&self.jewelry_types).map_err(|e| {
                RepositoryError::DataCorruption(format!(
                    "invalid jewelry types on request {}: {e}",
                    self.id
                ))
            })?;
        let status = self.status.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("request {}: {e}", self.id))
        })?;

        Ok(DesignRequest {
            id: DesignRequestId::new(self.id),
            user_id: self.user_id.map(UserId::new),
            name: self.name,
            email: self.email,
            jewelry_types,
            description: self.description,
            budget: self.budget,
            reference_image_url: self.reference_image_url,
            status,
            created_at: self.created_at,
        })
    }
}

/// Repository for design-request triage.
pub struct DesignRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DesignRequestRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List requests, newest first, optionally by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn list(
        &self,
        status: Option<DesignRequestStatus>,
    ) -> Result<Vec<DesignRequest>, RepositoryError> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, DesignRequestRow>(&format!(
                    r"
                    SELECT {DESIGN_REQUEST_COLUMNS} FROM design_requests
                    WHERE status = $1 ORDER BY created_at DESC
                    ",
                ))
                .bind(status.to_string())
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, DesignRequestRow>(&format!(
                    "SELECT {DESIGN_REQUEST_COLUMNS} FROM design_requests ORDER BY created_at DESC",
                ))
                .fetch_all(self.pool)
                .await?
            }
        };

        rows.into_iter().map(DesignRequestRow::into_domain).collect()
    }

    /// Move a request to a new triage status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn set_status(
        &self,
        id: &DesignRequestId,
        status: DesignRequestStatus,
    ) -> Result<Option<DesignRequest>, RepositoryError> {
        let row = sqlx::query_as::<_, DesignRequestRow>(&format!(
            r"
            UPDATE design_requests SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {DESIGN_REQUEST_COLUMNS}
            ",
        ))
        .bind(id.as_str())
        .bind(status.to_string())
        .fetch_optional(self.pool)
        .await?;

        row.map(DesignRequestRow::into_domain).transpose()
    }
}
