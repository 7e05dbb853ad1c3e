//! Category error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur in category operations.
///
/// Cache failures never appear here: on writes they are reported through
/// [`super::CacheWrite`], on reads they trigger a store fallback.
#[derive(Debug, Error)]
pub enum CategoryError {
    /// A category with this name (or id) already exists.
    #[error("category already exists")]
    AlreadyExists,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
