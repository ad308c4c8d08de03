//! Admin user management.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use rand::Rng;
use rand::distr::Alphanumeric;
use secrecy::SecretString;

use aurelle_admin::db::admin_users::AdminUserRepository;
use aurelle_core::{AdminRole, Email};

/// Create an admin user, generating a password when none is given.
///
/// # Errors
///
/// Returns an error for a malformed email/role, a duplicate user, or a
/// database failure.
pub async fn create(
    email: &str,
    name: &str,
    role: &str,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email)?;
    let role: AdminRole = role.parse()?;

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| "ADMIN_DATABASE_URL not set")?;
    let pool = aurelle_admin::db::create_pool(&database_url).await?;

    let (password, generated) = match password {
        Some(p) => (p, false),
        None => {
            let p: String = rand::rng()
                .sample_iter(&Alphanumeric)
                .take(20)
                .map(char::from)
                .collect();
            (p, true)
        }
    };

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| format!("password hashing failed: {e}"))?
        .to_string();

    let admin = AdminUserRepository::new(&pool)
        .create(&email, name, &hash, role)
        .await?;

    tracing::info!(id = %admin.id, email = %admin.email, role = %admin.role, "admin user created");
    if generated {
        // The only copy of the generated password; hand it to the operator.
        tracing::info!("generated password: {password}");
    }

    Ok(())
}
