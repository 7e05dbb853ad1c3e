//! Category mirror: a best-effort copy of the category store.
//!
//! The mirror is either cold (absent) or warm (holds the full set as of its
//! last population). Single categories are only ever added to a warm
//! mirror, so a warm mirror never hides categories the store has. The whole
//! mirror expires a fixed time after it was populated.
//!
//! Every add bumps a generation counter, warm or cold. A population carries
//! the generation read before its store snapshot and is dropped if any add
//! happened since, so a snapshot that raced a create never warms the mirror.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tokio::sync::Mutex;

use coledzh_shop_core::CategoryId;

use super::CacheError;
use crate::models::Category;

const CATEGORIES_KEY: &str = "categories";
const GENERATION_KEY: &str = "categories:generation";

/// Bumps the generation, then adds one field to the mirror hash only if the
/// hash exists.
const ADD_IF_WARM: &str = r"
redis.call('INCR', KEYS[2])
if redis.call('EXISTS', KEYS[1]) == 1 then
    redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
    return 1
end
return 0
";

/// Repopulates the mirror hash if the generation still equals ARGV[1].
/// ARGV[2] is the TTL in seconds, followed by id/name pairs.
const REPLACE_IF_CURRENT: &str = r"
local current = tonumber(redis.call('GET', KEYS[2]) or '0')
if current ~= tonumber(ARGV[1]) then
    return 0
end
redis.call('DEL', KEYS[1])
for i = 3, #ARGV, 2 do
    redis.call('HSET', KEYS[1], ARGV[i], ARGV[i + 1])
end
if #ARGV > 2 then
    redis.call('EXPIRE', KEYS[1], ARGV[2])
end
return 1
";

/// Best-effort category mirror. Failures mean "unavailable", never "wrong".
#[async_trait]
pub trait CategoryCache: Send + Sync {
    /// Add a category to a warm mirror.
    ///
    /// Returns `false` without writing when the mirror is cold.
    async fn save_category(&self, category: &Category) -> Result<bool, CacheError>;

    /// The mirrored set, or `None` when the mirror is cold.
    async fn all_categories(&self) -> Result<Option<Vec<Category>>, CacheError>;

    /// Current add generation. Read it before taking the store snapshot
    /// that is handed to [`CategoryCache::replace_all`].
    async fn generation(&self) -> Result<u64, CacheError>;

    /// Replace the mirror with `categories` and restart its expiry.
    ///
    /// Returns `false` without writing when an add happened after
    /// `generation` was read.
    async fn replace_all(
        &self,
        categories: &[Category],
        generation: u64,
    ) -> Result<bool, CacheError>;
}

/// Redis-backed mirror stored as one hash, `categories`, of id -> name.
#[derive(Clone)]
pub struct RedisCategoryCache {
    redis: ConnectionManager,
    ttl: Duration,
    add_if_warm: Arc<redis::Script>,
    replace_if_current: Arc<redis::Script>,
}

impl RedisCategoryCache {
    /// Create a mirror that expires `ttl` after each full population.
    #[must_use]
    pub fn new(redis: ConnectionManager, ttl: Duration) -> Self {
        Self {
            redis,
            ttl,
            add_if_warm: Arc::new(redis::Script::new(ADD_IF_WARM)),
            replace_if_current: Arc::new(redis::Script::new(REPLACE_IF_CURRENT)),
        }
    }
}

#[async_trait]
impl CategoryCache for RedisCategoryCache {
    async fn save_category(&self, category: &Category) -> Result<bool, CacheError> {
        let mut con = self.redis.clone();
        let added: i64 = self
            .add_if_warm
            .key(CATEGORIES_KEY)
            .key(GENERATION_KEY)
            .arg(category.id.to_string())
            .arg(&category.name)
            .invoke_async(&mut con)
            .await?;
        Ok(added == 1)
    }

    async fn all_categories(&self) -> Result<Option<Vec<Category>>, CacheError> {
        let mut con = self.redis.clone();
        let raw: HashMap<String, String> = con.hgetall(CATEGORIES_KEY).await?;
        if raw.is_empty() {
            return Ok(None);
        }

        raw.into_iter()
            .map(|(id, name)| {
                let id = id
                    .parse::<CategoryId>()
                    .map_err(|e| CacheError::Corrupt(format!("category id {id:?}: {e}")))?;
                Ok::<_, CacheError>(Category { id, name })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    async fn generation(&self) -> Result<u64, CacheError> {
        let mut con = self.redis.clone();
        let generation: Option<u64> = con.get(GENERATION_KEY).await?;
        Ok(generation.unwrap_or(0))
    }

    async fn replace_all(
        &self,
        categories: &[Category],
        generation: u64,
    ) -> Result<bool, CacheError> {
        let mut con = self.redis.clone();
        let ttl = self.ttl.as_secs().max(1);

        // Redis has no empty hash; an empty store leaves the mirror cold.
        let mut invocation = self.replace_if_current.prepare_invoke();
        invocation
            .key(CATEGORIES_KEY)
            .key(GENERATION_KEY)
            .arg(generation)
            .arg(ttl);
        for category in categories {
            invocation.arg(category.id.to_string()).arg(&category.name);
        }

        let replaced: i64 = invocation.invoke_async(&mut con).await?;
        Ok(replaced == 1)
    }
}

struct MirrorExpiry {
    ttl: Duration,
}

impl Expiry<&'static str, Arc<Vec<Category>>> for MirrorExpiry {
    // Updates keep the remaining lifetime (the trait default), so adding one
    // category does not extend the mirror.
    fn expire_after_create(
        &self,
        _key: &&'static str,
        _value: &Arc<Vec<Category>>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(self.ttl)
    }
}

/// In-process mirror held as a single moka entry.
pub struct MemoryCategoryCache {
    mirror: Cache<&'static str, Arc<Vec<Category>>>,
    // Add generation; also serializes read-modify-write updates of the entry.
    generation: Mutex<u64>,
}

impl MemoryCategoryCache {
    /// Create a cold mirror that expires `ttl` after each full population.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            mirror: Cache::builder()
                .max_capacity(1)
                .expire_after(MirrorExpiry { ttl })
                .build(),
            generation: Mutex::new(0),
        }
    }
}

#[async_trait]
impl CategoryCache for MemoryCategoryCache {
    async fn save_category(&self, category: &Category) -> Result<bool, CacheError> {
        let mut generation = self.generation.lock().await;
        *generation += 1;
        let Some(current) = self.mirror.get(CATEGORIES_KEY).await else {
            return Ok(false);
        };

        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(category.clone());
        self.mirror.insert(CATEGORIES_KEY, Arc::new(next)).await;
        Ok(true)
    }

    async fn all_categories(&self) -> Result<Option<Vec<Category>>, CacheError> {
        Ok(self
            .mirror
            .get(CATEGORIES_KEY)
            .await
            .map(|categories| categories.as_ref().clone()))
    }

    async fn generation(&self) -> Result<u64, CacheError> {
        Ok(*self.generation.lock().await)
    }

    async fn replace_all(
        &self,
        categories: &[Category],
        generation: u64,
    ) -> Result<bool, CacheError> {
        let current = self.generation.lock().await;
        if *current != generation {
            return Ok(false);
        }
        // Invalidate first so the insert counts as a creation and restarts expiry.
        self.mirror.invalidate(CATEGORIES_KEY).await;
        self.mirror
            .insert(CATEGORIES_KEY, Arc::new(categories.to_vec()))
            .await;
        Ok(true)
    }
}
