//! Ephemeral key-value stores: sessions and the category mirror.
//!
//! Both seams have two implementations:
//! - Redis (`ConnectionManager`), shared by every server instance
//! - moka, in-process, for single-instance deployments and tests
//!
//! Selected at startup by `SHOP_CACHE_BACKEND`.

use redis::aio::ConnectionManager;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

pub mod categories;
pub mod sessions;

pub use categories::{CategoryCache, MemoryCategoryCache, RedisCategoryCache};
pub use sessions::{MemorySessionStore, RedisSessionStore, SessionStore};

/// Errors from the session store or the category cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Redis command or connection failure.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A cached value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A cached value decoded but is not a valid domain value.
    #[error("corrupt cache entry: {0}")]
    Corrupt(String),
}

/// Open a managed Redis connection.
///
/// The returned manager reconnects on its own and is cheap to clone.
///
/// # Errors
///
/// Returns `CacheError::Redis` if the URL is invalid or the first
/// connection attempt fails.
pub async fn connect_redis(url: &SecretString) -> Result<ConnectionManager, CacheError> {
    let client = redis::Client::open(url.expose_secret())?;
    let manager = ConnectionManager::new(client).await?;
    Ok(manager)
}
