//! Durable stores backed by `PostgreSQL`.
//!
//! Each module pairs a store trait (the seam services depend on) with its
//! `PostgreSQL` implementation.
//!
//! ## Tables
//!
//! - `users` - Accounts with role and verification flag
//! - `tokens` - Single-purpose tokens (email verification)
//! - `categories` - Catalogue categories, authoritative copy
//! - `products`, `products_categories` - Catalogue items and their categories
//! - `cart_items` - One row per product placed in a user's cart
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p coledzh-shop-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod carts;
pub mod categories;
pub mod products;
pub mod tokens;
pub mod users;

pub use carts::{CartStore, PgCartStore};
pub use categories::{CategoryStore, PgCategoryStore};
pub use products::{PgProductStore, ProductStore};
pub use tokens::{PgTokenStore, TokenStore};
pub use users::{PgUserStore, UserStore};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation (e.g., duplicate email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Foreign key violation (a referenced row does not exist).
    #[error("invalid reference: {0}")]
    InvalidReference(String),
}

impl RepositoryError {
    /// Classify a sqlx error, turning constraint violations into
    /// `Conflict`/`InvalidReference` with the given context.
    pub(crate) fn from_write(e: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return Self::Conflict(format!("{what} already exists"));
            }
            if db_err.is_foreign_key_violation() {
                return Self::InvalidReference(format!("{what} references a missing row"));
            }
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
