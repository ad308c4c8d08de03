//! Password authentication.
//!
//! Register/login with Argon2id hashing. Sessions carry only the minimal
//! identity; everything else is looked up per request.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use aurelle_core::Email;

use crate::db::{RepositoryError, User, UserRepository};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] aurelle_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

/// Register a new user.
///
/// # Errors
///
/// `UserAlreadyExists` for duplicate emails, `WeakPassword`/`InvalidEmail`
/// for failing validation, and repository errors otherwise.
pub async fn register(
    repo: &UserRepository<'_>,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    let email = Email::parse(email)?;
    validate_password(password)?;

    let hash = hash_password(password)?;
    repo.create(&email, &hash).await.map_err(|e| match e {
        RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
        other => AuthError::Repository(other),
    })
}

/// Verify credentials and return the user.
///
/// # Errors
///
/// `InvalidCredentials` for an unknown email or wrong password.
pub async fn login(
    repo: &UserRepository<'_>,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

    let user = repo
        .get_by_email(&email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    verify_password(password, &user.password_hash)?;
    Ok(user)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("opal-and-onyx-99").expect("hash");
        assert!(verify_password("opal-and-onyx-99", &hash).is_ok());
        assert!(verify_password("wrong-password", &hash).is_err());
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }
}
