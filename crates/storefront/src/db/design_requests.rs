//! Custom-design request intake.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use aurelle_core::{DesignRequestId, DesignRequestStatus, UserId};

use super::RepositoryError;

/// A submitted custom-design request.
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

/// Fields collected by the intake form.
#[derive(Debug, Clone)]
pub struct NewDesignRequest {
    pub user_id: Option<UserId>,
    pub name: String,
    pub email: String,
    /// At least one entry; the route validates before calling.
    pub jewelry_types: Vec<String>,
    pub description: Option<String>,
    pub budget: Option<String>,
    pub reference_image_url: Option<String>,
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

/// Repository for design-request operations.
pub struct DesignRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DesignRequestRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a design request with status `received`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn create(
        &self,
        request: NewDesignRequest,
    ) -> Result<DesignRequest, RepositoryError> {
        let id = Uuid::new_v4().to_string();
        let jewelry_types = serde_json::to_string(&request.jewelry_types).map_err(|e| {
            RepositoryError::DataCorruption(format!("unserializable jewelry types: {e}"))
        })?;

        let row = sqlx::query_as::<_, DesignRequestRow>(&format!(
            r"
            INSERT INTO design_requests
                (id, user_id, name, email, jewelry_types, description, budget,
                 reference_image_url, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {DESIGN_REQUEST_COLUMNS}
            ",
        ))
        .bind(&id)
        .bind(request.user_id.as_ref().map(aurelle_core::UserId::as_str))
        .bind(&request.name)
        .bind(&request.email)
        .bind(&jewelry_types)
        .bind(&request.description)
        .bind(&request.budget)
        .bind(&request.reference_image_url)
        .bind(DesignRequestStatus::Received.to_string())
        .fetch_one(self.pool)
        .await?;

        row.into_domain()
    }

    /// List a user's own requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<DesignRequest>, RepositoryError> {
        let rows = sqlx::query_as::<_, DesignRequestRow>(&format!(
            r"
            SELECT {DESIGN_REQUEST_COLUMNS} FROM design_requests
            WHERE user_id = $1 ORDER BY created_at DESC
            ",
        ))
        .bind(user_id.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(DesignRequestRow::into_domain).collect()
    }
}
