//! Application state shared across handlers.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::cache::{
    self, CacheError, CategoryCache, MemoryCategoryCache, MemorySessionStore, RedisCategoryCache,
    RedisSessionStore, SessionStore,
};
use crate::config::{CacheBackend, ServerConfig};
use crate::db::{
    self, CartStore, CategoryStore, PgCartStore, PgCategoryStore, PgProductStore, PgTokenStore,
    PgUserStore, ProductStore, TokenStore, UserStore,
};
use crate::services::{
    Argon2Verifier, AuthService, CartService, CategoryService, CredentialVerifier,
    LogVerificationSender, ProductService, SessionService, TokenService, VerificationSender,
};

/// Error wiring up the production backends.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("cache connection failed: {0}")]
    Cache(#[from] CacheError),
}

/// The collaborators services are built on.
pub struct Backends {
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<dyn TokenStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub category_cache: Arc<dyn CategoryCache>,
    pub products: Arc<dyn ProductStore>,
    pub carts: Arc<dyn CartStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub mailer: Arc<dyn VerificationSender>,
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the services and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    auth: Arc<AuthService>,
    tokens: TokenService,
    categories: CategoryService,
    sessions: SessionService,
    products: ProductService,
    carts: CartService,
    mailer: Arc<dyn VerificationSender>,
}

impl AppState {
    /// Build the services on top of the given backends.
    #[must_use]
    pub fn new(config: ServerConfig, backends: Backends) -> Self {
        let auth = Arc::new(AuthService::new(
            backends.users,
            Arc::clone(&backends.sessions),
            backends.verifier,
            config.session_ttl,
        ));
        let tokens = TokenService::new(backends.tokens, auth.clone());

        Self {
            inner: Arc::new(AppStateInner {
                auth,
                tokens,
                categories: CategoryService::new(backends.categories, backends.category_cache),
                sessions: SessionService::new(backends.sessions),
                products: ProductService::new(backends.products),
                carts: CartService::new(backends.carts),
                mailer: backends.mailer,
                config,
            }),
        }
    }

    /// Connect to `PostgreSQL` and the configured cache backend.
    ///
    /// # Errors
    ///
    /// Returns `StartupError` if either connection cannot be established.
    pub async fn connect(config: ServerConfig) -> Result<Self, StartupError> {
        let pool = db::create_pool(&config.database_url).await?;
        info!("Connected to database");

        let (sessions, category_cache): (Arc<dyn SessionStore>, Arc<dyn CategoryCache>) =
            match &config.cache.backend {
                CacheBackend::Redis(url) => {
                    let redis = cache::connect_redis(url).await?;
                    info!("Connected to Redis");
                    (
                        Arc::new(RedisSessionStore::new(redis.clone())),
                        Arc::new(RedisCategoryCache::new(redis, config.cache.category_ttl)),
                    )
                }
                CacheBackend::Memory => {
                    info!("Using in-process caches");
                    (
                        Arc::new(MemorySessionStore::new()),
                        Arc::new(MemoryCategoryCache::new(config.cache.category_ttl)),
                    )
                }
            };

        let backends = Backends {
            users: Arc::new(PgUserStore::new(pool.clone())),
            tokens: Arc::new(PgTokenStore::new(pool.clone())),
            categories: Arc::new(PgCategoryStore::new(pool.clone())),
            category_cache,
            products: Arc::new(PgProductStore::new(pool.clone())),
            carts: Arc::new(PgCartStore::new(pool)),
            sessions,
            verifier: Arc::new(Argon2Verifier),
            mailer: Arc::new(LogVerificationSender),
        };

        Ok(Self::new(config, backends))
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    #[must_use]
    pub fn categories(&self) -> &CategoryService {
        &self.inner.categories
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionService {
        &self.inner.sessions
    }

    #[must_use]
    pub fn products(&self) -> &ProductService {
        &self.inner.products
    }

    #[must_use]
    pub fn carts(&self) -> &CartService {
        &self.inner.carts
    }

    /// Get the verification link sender.
    #[must_use]
    pub fn mailer(&self) -> &dyn VerificationSender {
        self.inner.mailer.as_ref()
    }
}
