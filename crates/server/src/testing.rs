//! In-memory fakes of the durable stores, for unit and router tests.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use coledzh_shop_core::{
    CartItemId, CategoryId, Email, Login, Password, ProductId, Role, TokenType, UserId,
};

use crate::cache::{CacheError, CategoryCache, MemoryCategoryCache, MemorySessionStore};
use crate::config::{CacheBackend, CacheConfig, ServerConfig};
use crate::db::{CartStore, CategoryStore, ProductStore, RepositoryError, TokenStore, UserStore};
use crate::models::{CartItem, Category, NewProduct, Product, ProductCard, User};
use crate::services::{CredentialVerifier, DeliveryError, HashError, VerificationSender};
use crate::state::{AppState, Backends};

/// Connect to the Redis named by `REDIS_URL`, for `#[ignore]`d tests.
pub async fn redis_from_env() -> redis::aio::ConnectionManager {
    let url = std::env::var("REDIS_URL").expect("REDIS_URL must be set to run redis tests");
    crate::cache::connect_redis(&url.into()).await.unwrap()
}

pub fn login(s: &str) -> Login {
    Login::parse(s).unwrap()
}

pub fn email(s: &str) -> Email {
    Email::parse(s).unwrap()
}

pub fn password(s: &str) -> Password {
    Password::parse(s).unwrap()
}

/// Reversible stand-in for argon2 so tests stay fast.
pub struct PlainVerifier;

impl CredentialVerifier for PlainVerifier {
    fn hash(&self, password: &Password) -> Result<String, HashError> {
        Ok(format!("plain:{}", password.expose()))
    }

    fn verify(&self, hash: &str, password: &Password) -> bool {
        hash.strip_prefix("plain:") == Some(password.expose())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<(User, String)>>,
}

impl MemoryUserStore {
    fn insert(
        &self,
        login: &Login,
        email: &Email,
        password_hash: &str,
        role: Role,
        email_verified: bool,
    ) -> Result<UserId, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|(u, _)| &u.login == login || &u.email == email)
        {
            return Err(RepositoryError::Conflict("user already exists".to_owned()));
        }
        let id = UserId::generate();
        users.push((
            User {
                id,
                login: login.clone(),
                email: email.clone(),
                role,
                email_verified,
            },
            password_hash.to_owned(),
        ));
        Ok(id)
    }

    pub fn by_id(&self, id: UserId) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone())
    }

    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn save_user(
        &self,
        login: &Login,
        email: &Email,
        password_hash: &str,
    ) -> Result<UserId, RepositoryError> {
        self.insert(login, email, password_hash, Role::User, false)
    }

    async fn save_admin(
        &self,
        login: &Login,
        email: &Email,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        self.insert(login, email, password_hash, Role::Admin, true)
            .map(|_| ())
    }

    async fn user_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| &u.email == email)
            .cloned())
    }

    async fn verify_email(&self, id: UserId) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().unwrap();
        let (user, _) = users
            .iter_mut()
            .find(|(u, _)| u.id == id)
            .ok_or(RepositoryError::NotFound)?;
        user.email_verified = true;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Vec<(String, UserId, TokenType)>>,
}

impl MemoryTokenStore {
    pub fn count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save_token(
        &self,
        user_id: UserId,
        token: &str,
        token_type: TokenType,
    ) -> Result<(), RepositoryError> {
        self.tokens
            .lock()
            .unwrap()
            .push((token.to_owned(), user_id, token_type));
        Ok(())
    }

    async fn user_id_by_token(
        &self,
        token: &str,
        token_type: TokenType,
    ) -> Result<Option<UserId>, RepositoryError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|(t, _, ty)| t == token && *ty == token_type)
            .map(|(_, user_id, _)| *user_id))
    }

    async fn delete_token(
        &self,
        token: &str,
        token_type: TokenType,
    ) -> Result<bool, RepositoryError> {
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|(t, _, ty)| !(t == token && *ty == token_type));
        Ok(tokens.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryCategoryStore {
    categories: Mutex<Vec<Category>>,
}

impl MemoryCategoryStore {
    pub fn with_names(names: &[&str]) -> Self {
        let store = Self::default();
        store.categories.lock().unwrap().extend(names.iter().map(|name| Category {
            id: CategoryId::generate(),
            name: (*name).to_owned(),
        }));
        store
    }

    pub fn snapshot(&self) -> Vec<Category> {
        self.categories.lock().unwrap().clone()
    }
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    async fn save_category(&self, category: &Category) -> Result<(), RepositoryError> {
        let mut categories = self.categories.lock().unwrap();
        if categories
            .iter()
            .any(|c| c.id == category.id || c.name == category.name)
        {
            return Err(RepositoryError::Conflict(
                "category already exists".to_owned(),
            ));
        }
        categories.push(category.clone());
        Ok(())
    }

    async fn all_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        Ok(self.snapshot())
    }
}

/// A category cache whose backend is unreachable.
pub struct UnavailableCategoryCache;

fn unreachable_redis() -> CacheError {
    CacheError::Redis(redis::RedisError::from((
        redis::ErrorKind::IoError,
        "connection refused",
    )))
}

#[async_trait]
impl CategoryCache for UnavailableCategoryCache {
    async fn save_category(&self, _category: &Category) -> Result<bool, CacheError> {
        Err(unreachable_redis())
    }

    async fn all_categories(&self) -> Result<Option<Vec<Category>>, CacheError> {
        Err(unreachable_redis())
    }

    async fn generation(&self) -> Result<u64, CacheError> {
        Err(unreachable_redis())
    }

    async fn replace_all(
        &self,
        _categories: &[Category],
        _generation: u64,
    ) -> Result<bool, CacheError> {
        Err(unreachable_redis())
    }
}

pub struct MemoryProductStore {
    categories: Arc<MemoryCategoryStore>,
    products: Mutex<Vec<Product>>,
}

impl MemoryProductStore {
    pub fn new(categories: Arc<MemoryCategoryStore>) -> Self {
        Self {
            categories,
            products: Mutex::new(Vec::new()),
        }
    }

    fn card(&self, id: ProductId) -> Option<ProductCard> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .map(|p| ProductCard {
                id: p.id,
                name: p.name.clone(),
                price: p.price,
            })
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn save_product(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<(), RepositoryError> {
        let known = self.categories.snapshot();
        let mut categories = Vec::new();
        for category_id in &product.category_ids {
            let category = known
                .iter()
                .find(|c| c.id == *category_id)
                .ok_or_else(|| RepositoryError::InvalidReference("category".to_owned()))?;
            categories.push(category.clone());
        }

        self.products.lock().unwrap().push(Product {
            id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            categories,
        });
        Ok(())
    }

    async fn products(
        &self,
        category_id: Option<CategoryId>,
        page: u32,
    ) -> Result<Vec<ProductCard>, RepositoryError> {
        let mut cards: Vec<ProductCard> = self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| category_id.is_none_or(|id| p.categories.iter().any(|c| c.id == id)))
            .map(|p| ProductCard {
                id: p.id,
                name: p.name.clone(),
                price: p.price,
            })
            .collect();
        cards.sort_by(|a, b| a.name.cmp(&b.name));
        let size = crate::db::products::PAGE_SIZE as usize;
        Ok(cards.into_iter().skip(page as usize * size).take(size).collect())
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }
}

pub struct MemoryCartStore {
    products: Arc<MemoryProductStore>,
    lines: Mutex<Vec<(CartItemId, UserId, ProductId)>>,
}

impl MemoryCartStore {
    pub fn new(products: Arc<MemoryProductStore>) -> Self {
        Self {
            products,
            lines: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartItemId, RepositoryError> {
        if self.products.card(product_id).is_none() {
            return Err(RepositoryError::InvalidReference("product".to_owned()));
        }
        let id = CartItemId::generate();
        self.lines.lock().unwrap().push((id, user_id, product_id));
        Ok(id)
    }

    async fn items(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let lines = self.lines.lock().unwrap().clone();
        Ok(lines
            .into_iter()
            .filter(|(_, owner, _)| *owner == user_id)
            .filter_map(|(id, _, product_id)| {
                self.products
                    .card(product_id)
                    .map(|product| CartItem { id, product })
            })
            .collect())
    }

    async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        self.lines
            .lock()
            .unwrap()
            .retain(|(_, owner, _)| *owner != user_id);
        Ok(())
    }
}

/// Records verification links instead of delivering them.
#[derive(Default)]
pub struct CapturingSender {
    sent: Mutex<Vec<(Email, String)>>,
}

impl CapturingSender {
    pub fn last_link_for(&self, to: &Email) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(email, _)| email == to)
            .map(|(_, link)| link.clone())
    }
}

#[async_trait]
impl VerificationSender for CapturingSender {
    async fn send_verification(&self, to: &Email, link: &str) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.clone(), link.to_owned()));
        Ok(())
    }
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: "postgres://localhost/unused".to_owned().into(),
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 0,
        base_url: "http://shop.test".to_owned(),
        cache: CacheConfig {
            backend: CacheBackend::Memory,
            category_ttl: Duration::from_secs(60),
        },
        session_ttl: Duration::from_secs(600),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Handles on the fakes behind a test [`AppState`].
pub struct Fakes {
    pub users: Arc<MemoryUserStore>,
    pub tokens: Arc<MemoryTokenStore>,
    pub categories: Arc<MemoryCategoryStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub mailer: Arc<CapturingSender>,
}

pub fn test_state() -> (AppState, Fakes) {
    let config = test_config();
    let users = Arc::new(MemoryUserStore::default());
    let tokens = Arc::new(MemoryTokenStore::default());
    let categories = Arc::new(MemoryCategoryStore::default());
    let products = Arc::new(MemoryProductStore::new(Arc::clone(&categories)));
    let carts = Arc::new(MemoryCartStore::new(Arc::clone(&products)));
    let sessions = Arc::new(MemorySessionStore::new());
    let mailer = Arc::new(CapturingSender::default());

    let backends = Backends {
        users: users.clone(),
        tokens: tokens.clone(),
        categories: categories.clone(),
        category_cache: Arc::new(MemoryCategoryCache::new(config.cache.category_ttl)),
        products,
        carts,
        sessions: sessions.clone(),
        verifier: Arc::new(PlainVerifier),
        mailer: mailer.clone(),
    };

    (
        AppState::new(config, backends),
        Fakes {
            users,
            tokens,
            categories,
            sessions,
            mailer,
        },
    )
}
