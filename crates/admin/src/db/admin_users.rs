//! Admin user repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use aurelle_core::{AdminRole, AdminUserId, Email};

use super::RepositoryError;

/// An admin user.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub password_hash: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct AdminUserRow {
    id: String,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl AdminUserRow {
    fn into_domain(self) -> Result<AdminUser, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = self.role.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("admin user {}: {e}", self.id))
        })?;

        Ok(AdminUser {
            id: AdminUserId::new(self.id),
            email,
            name: self.name,
            password_hash: self.password_hash,
            role,
            created_at: self.created_at,
        })
    }
}

/// Repository for admin user operations.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an admin user by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            "SELECT id, email, name, password_hash, role, created_at FROM admin_users WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(AdminUserRow::into_domain).transpose()
    }

    /// Create an admin user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` for a duplicate email.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        password_hash: &str,
        role: AdminRole,
    ) -> Result<AdminUser, RepositoryError> {
        let id = Uuid::new_v4().to_string();

        let row = sqlx::query_as::<_, AdminUserRow>(
            r"
            INSERT INTO admin_users (id, email, name, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, name, password_hash, role, created_at
            ",
        )
        .bind(&id)
        .bind(email.as_str())
        .bind(name)
        .bind(password_hash)
        .bind(role.to_string())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_domain()
    }
}
