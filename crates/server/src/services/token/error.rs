//! Token error types.

use thiserror::Error;

use coledzh_shop_core::UnknownTokenType;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Errors that can occur while minting or redeeming tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// No token with this value and purpose exists (or it was already redeemed).
    #[error("token not found")]
    TokenNotFound,

    /// The requested token purpose is not supported.
    #[error(transparent)]
    WrongTokenType(#[from] UnknownTokenType),

    /// Marking the owner verified failed.
    #[error("verification failed: {0}")]
    Verification(#[from] AuthError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
