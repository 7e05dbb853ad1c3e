//! Admin account management.
//!
//! # Usage
//!
//! ```bash
//! coledzh-cli admin create -l root -e root@coledzh.shop -p '...'
//! ```
//!
//! # Environment Variables
//!
//! - `SHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `SHOP_ADMIN_PASSWORD` - Password, when `--password` is omitted

use std::sync::Arc;
use std::time::Duration;

use coledzh_shop_core::{Email, EmailError, Login, NameError, Password, PasswordError};
use coledzh_shop_server::cache::MemorySessionStore;
use coledzh_shop_server::config::{ConfigError, get_database_url};
use coledzh_shop_server::db::{self, PgUserStore};
use coledzh_shop_server::services::{Argon2Verifier, AuthError, AuthService};
use thiserror::Error;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid login: {0}")]
    InvalidLogin(#[from] NameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordError),

    /// Login or email is taken.
    #[error("AlreadyExists: a user with login {0} or this email already exists")]
    AlreadyExists(String),

    #[error(transparent)]
    Auth(AuthError),
}

/// Create a verified admin account.
///
/// # Errors
///
/// Returns `AdminError::AlreadyExists` if the login or email is taken.
pub async fn create_admin(login: &str, email: &str, password: &str) -> Result<(), AdminError> {
    dotenvy::dotenv().ok();

    let login = Login::parse(login)?;
    let email = Email::parse(email)?;
    let password = Password::parse(password)?;

    let database_url = get_database_url("SHOP_DATABASE_URL")?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    // Registration never opens a session, so the session store is unused.
    let auth = AuthService::new(
        Arc::new(PgUserStore::new(pool)),
        Arc::new(MemorySessionStore::new()),
        Arc::new(Argon2Verifier),
        Duration::ZERO,
    );

    auth.register_admin(&login, &email, &password)
        .await
        .map_err(|e| match e {
            AuthError::AlreadyExists => AdminError::AlreadyExists(login.to_string()),
            other => AdminError::Auth(other),
        })?;

    tracing::info!(%login, %email, "Admin user created");
    Ok(())
}
