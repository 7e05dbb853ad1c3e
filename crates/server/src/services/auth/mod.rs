//! Authentication service.
//!
//! Registration, admin bootstrap, password login and the email-verified
//! gate. No session is ever minted for an unverified user.

mod error;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use coledzh_shop_core::{Email, Login, Password, UserId};

pub use error::AuthError;

use crate::cache::SessionStore;
use crate::db::{RepositoryError, UserStore};
use crate::models::{SessionId, SessionUser};
use crate::services::password::CredentialVerifier;
use crate::services::token::EmailVerifier;

/// Authentication service.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    verifier: Arc<dyn CredentialVerifier>,
    session_ttl: Duration,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        verifier: Arc<dyn CredentialVerifier>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            verifier,
            session_ttl,
        }
    }

    /// How long a minted session stays valid.
    #[must_use]
    pub const fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Register an ordinary, unverified user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AlreadyExists` if the login or email is taken.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        login: &Login,
        email: &Email,
        password: &Password,
    ) -> Result<UserId, AuthError> {
        let password_hash = self.verifier.hash(password)?;
        let id = self
            .users
            .save_user(login, email, &password_hash)
            .await
            .map_err(AuthError::on_insert)?;

        info!(user_id = %id, "user registered");
        Ok(id)
    }

    /// Register a pre-verified admin. Only reachable from the CLI.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AlreadyExists` if the login or email is taken.
    #[instrument(skip(self, password))]
    pub async fn register_admin(
        &self,
        login: &Login,
        email: &Email,
        password: &Password,
    ) -> Result<(), AuthError> {
        let password_hash = self.verifier.hash(password)?;
        self.users
            .save_admin(login, email, &password_hash)
            .await
            .map_err(AuthError::on_insert)?;

        info!("admin registered");
        Ok(())
    }

    /// Check credentials and mint a session.
    ///
    /// The verified flag is checked before the password. Callers at a
    /// public boundary must not reveal `EmailNotVerified` to the client.
    ///
    /// # Errors
    ///
    /// - `AuthError::NotFound` for an unknown email or a wrong password
    /// - `AuthError::EmailNotVerified` for any unverified account
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &Email, password: &Password) -> Result<SessionId, AuthError> {
        let Some((user, password_hash)) = self.users.user_by_email(email).await? else {
            debug!("login for unknown email");
            return Err(AuthError::NotFound);
        };

        if !user.email_verified {
            debug!(user_id = %user.id, "login before email verification");
            return Err(AuthError::EmailNotVerified);
        }

        if !self.verifier.verify(&password_hash, password) {
            debug!(user_id = %user.id, "login with wrong password");
            return Err(AuthError::NotFound);
        }

        let session_id = SessionId::generate();
        self.sessions
            .save_session(&session_id, &SessionUser::from(&user), self.session_ttl)
            .await?;

        info!(user_id = %user.id, "user logged in");
        Ok(session_id)
    }

    /// Mark a user's email as verified. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotFound` if the user does not exist.
    pub async fn verify_email(&self, user_id: UserId) -> Result<(), AuthError> {
        self.users
            .verify_email(user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::NotFound,
                other => AuthError::Repository(other),
            })?;

        info!(user_id = %user_id, "email verified");
        Ok(())
    }
}

#[async_trait]
impl EmailVerifier for AuthService {
    async fn mark_verified(&self, user_id: UserId) -> Result<(), AuthError> {
        self.verify_email(user_id).await
    }
}
