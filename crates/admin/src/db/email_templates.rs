//! Marketing email templates.
//!
//! Bodies are plain text with `{{placeholder}}` slots filled at send time.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use aurelle_core::EmailTemplateId;

use super::RepositoryError;

/// A stored email template.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EmailTemplate {
    pub id: EmailTemplateId,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

/// Editable template fields.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct EmailTemplateInput {
    pub name: String,
    pub subject: String,
    pub body: String,
}

#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: String,
    name: String,
    subject: String,
    body: String,
    updated_at: DateTime<Utc>,
}

impl TemplateRow {
    fn into_domain(self) -> EmailTemplate {
        EmailTemplate {
            id: EmailTemplateId::new(self.id),
            name: self.name,
            subject: self.subject,
            body: self.body,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for email-template CRUD.
pub struct EmailTemplateRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EmailTemplateRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List templates by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn list(&self) -> Result<Vec<EmailTemplate>, RepositoryError> {
        let rows = sqlx::query_as::<_, TemplateRow>(
            "SELECT id, name, subject, body, updated_at FROM email_templates ORDER BY name ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(TemplateRow::into_domain).collect())
    }

    /// Fetch a template by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn get(&self, id: &EmailTemplateId) -> Result<Option<EmailTemplate>, RepositoryError> {
        let row = sqlx::query_as::<_, TemplateRow>(
            "SELECT id, name, subject, body, updated_at FROM email_templates WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(TemplateRow::into_domain))
    }

    /// Create a template.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` for a duplicate name.
    pub async fn create(
        &self,
        input: &EmailTemplateInput,
    ) -> Result<EmailTemplate, RepositoryError> {
        let id = Uuid::new_v4().to_string();

        let row = sqlx::query_as::<_, TemplateRow>(
            r"
            INSERT INTO email_templates (id, name, subject, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, subject, body, updated_at
            ",
        )
        .bind(&id)
        .bind(&input.name)
        .bind(&input.subject)
        .bind(&input.body)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("template name already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into_domain())
    }

    /// Update a template.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn update(
        &self,
        id: &EmailTemplateId,
        input: &EmailTemplateInput,
    ) -> Result<Option<EmailTemplate>, RepositoryError> {
        let row = sqlx::query_as::<_, TemplateRow>(
            r"
            UPDATE email_templates
            SET name = $2, subject = $3, body = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, subject, body, updated_at
            ",
        )
        .bind(id.as_str())
        .bind(&input.name)
        .bind(&input.subject)
        .bind(&input.body)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(TemplateRow::into_domain))
    }

    /// Delete a template.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn delete(&self, id: &EmailTemplateId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM email_templates WHERE id = $1")
            .bind(id.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
