//! Authentication error types.

use thiserror::Error;

use crate::cache::CacheError;
use crate::db::RepositoryError;
use crate::services::password::HashError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login or email is already registered.
    #[error("user already exists")]
    AlreadyExists,

    /// No such user, or the password did not match.
    ///
    /// Both cases share this variant so callers cannot tell whether an
    /// account exists.
    #[error("user not found")]
    NotFound,

    /// Correct credentials, but the email has not been verified yet.
    #[error("email is not verified")]
    EmailNotVerified,

    /// Password hashing error.
    #[error(transparent)]
    PasswordHash(#[from] HashError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Session store error.
    #[error("session store error: {0}")]
    SessionStore(#[from] CacheError),
}

impl AuthError {
    /// Map store errors on insert, surfacing uniqueness violations as `AlreadyExists`.
    pub(crate) fn on_insert(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(_) => Self::AlreadyExists,
            other => Self::Repository(other),
        }
    }
}
