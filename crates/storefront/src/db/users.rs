//! User repository: authentication rows and the shipping-prefill profile.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use aurelle_core::{Email, UserId};

use super::RepositoryError;

/// A storefront user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The saved profile used to prefill shipping details at checkout.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Profile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_domain(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            email,
            password_hash: self.password_hash,
            created_at: self.created_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `DataCorruption` for an invalid stored email.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `DataCorruption` for an invalid stored email.
    pub async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let id = Uuid::new_v4().to_string();

        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, created_at
            ",
        )
        .bind(&id)
        .bind(email.as_str())
        .bind(password_hash)
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

    /// Fetch the profile fields for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn profile(&self, id: &UserId) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, (Option<String>, Option<String>, Option<String>, Option<String>, Option<String>, Option<String>)>(
            r"
            SELECT first_name, last_name, phone, address, city, zip_code
            FROM users WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(
            |(first_name, last_name, phone, address, city, zip_code)| Profile {
                first_name,
                last_name,
                phone,
                address,
                city,
                zip_code,
            },
        ))
    }

    /// Update the profile fields for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_profile(
        &self,
        id: &UserId,
        profile: &Profile,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE users
            SET first_name = $2, last_name = $3, phone = $4,
                address = $5, city = $6, zip_code = $7, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.phone)
        .bind(&profile.address)
        .bind(&profile.city)
        .bind(&profile.zip_code)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
