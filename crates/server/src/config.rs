//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `REDIS_URL` - Redis connection string, when the cache backend is `redis`
//!
//! ## Optional
//! - `SHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOP_PORT` - Listen port (default: 8080)
//! - `SHOP_BASE_URL` - Public URL used in verification links (default: <http://localhost:8080>)
//! - `SHOP_CACHE_BACKEND` - `redis` or `memory` (default: redis)
//! - `SHOP_SESSION_TTL_SECS` - Session lifetime (default: 432000, five days)
//! - `SHOP_CATEGORY_CACHE_TTL_SECS` - Category mirror lifetime (default: 3600)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_SESSION_TTL_SECS: &str = "432000";
const DEFAULT_CATEGORY_CACHE_TTL_SECS: &str = "3600";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, without a trailing slash
    pub base_url: String,
    /// Session and category cache backends
    pub cache: CacheConfig,
    /// Lifetime of a login session
    pub session_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Where sessions and the category mirror live.
#[derive(Debug, Clone)]
pub enum CacheBackend {
    /// Shared Redis instance.
    Redis(SecretString),
    /// In-process moka caches. Sessions do not survive a restart.
    Memory,
}

/// Cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Fixed lifetime of the category mirror after population
    pub category_ttl: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SHOP_DATABASE_URL")?;
        let host = get_env_or_default("SHOP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOP_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SHOP_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOP_PORT".to_string(), e.to_string()))?;
        let base_url = normalize_base_url(&get_env_or_default(
            "SHOP_BASE_URL",
            "http://localhost:8080",
        ));

        let cache = CacheConfig {
            backend: parse_backend(
                &get_env_or_default("SHOP_CACHE_BACKEND", "redis"),
                get_optional_env("REDIS_URL"),
            )?,
            category_ttl: parse_secs(
                "SHOP_CATEGORY_CACHE_TTL_SECS",
                &get_env_or_default(
                    "SHOP_CATEGORY_CACHE_TTL_SECS",
                    DEFAULT_CATEGORY_CACHE_TTL_SECS,
                ),
            )?,
        };
        let session_ttl = parse_secs(
            "SHOP_SESSION_TTL_SECS",
            &get_env_or_default("SHOP_SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS),
        )?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            cache,
            session_ttl,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must carry the `Secure` attribute.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Link a new user follows to verify their email.
    #[must_use]
    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/auth/verify/{token}", self.base_url)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
pub fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn parse_backend(kind: &str, redis_url: Option<String>) -> Result<CacheBackend, ConfigError> {
    match kind.trim().to_ascii_lowercase().as_str() {
        "redis" => redis_url
            .map(|url| CacheBackend::Redis(SecretString::from(url)))
            .ok_or_else(|| ConfigError::MissingEnvVar("REDIS_URL".to_string())),
        "memory" => Ok(CacheBackend::Memory),
        other => Err(ConfigError::InvalidEnvVar(
            "SHOP_CACHE_BACKEND".to_string(),
            format!("expected 'redis' or 'memory', got '{other}'"),
        )),
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::test_config;

    #[test]
    fn test_parse_backend_memory() {
        assert!(matches!(
            parse_backend("Memory", None).unwrap(),
            CacheBackend::Memory
        ));
    }

    #[test]
    fn test_parse_backend_redis_requires_url() {
        let err = parse_backend("redis", None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "REDIS_URL"));

        let backend = parse_backend("redis", Some("redis://localhost:6379".to_string()));
        assert!(matches!(backend.unwrap(), CacheBackend::Redis(_)));
    }

    #[test]
    fn test_parse_backend_unknown() {
        assert!(matches!(
            parse_backend("memcached", None),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("K", "3600").unwrap(), Duration::from_secs(3600));
        assert!(parse_secs("K", "0").is_err());
        assert!(parse_secs("K", "soon").is_err());
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url(" https://shop.example/ "),
            "https://shop.example"
        );
    }

    #[test]
    fn test_cookie_secure_follows_scheme() {
        let mut config = test_config();
        assert!(!config.cookie_secure());
        config.base_url = "https://shop.example".to_string();
        assert!(config.cookie_secure());
    }

    #[test]
    fn test_verification_link() {
        let config = test_config();
        assert_eq!(
            config.verification_link("abc"),
            "http://shop.test/auth/verify/abc"
        );
    }

    #[test]
    fn test_socket_addr() {
        let mut config = test_config();
        config.port = 8080;
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }
}
