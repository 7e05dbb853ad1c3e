//! Session store: session id -> user snapshot, with a fixed TTL.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::CacheError;
use crate::models::{SessionId, SessionUser};

const SESSION_KEY_PREFIX: &str = "session:";

/// Ephemeral session records. Entries disappear once their TTL elapses.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a snapshot under `id` for `ttl`.
    async fn save_session(
        &self,
        id: &SessionId,
        user: &SessionUser,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Resolve a live session. Expired and unknown ids both yield `None`.
    async fn session_by_id(&self, id: &SessionId) -> Result<Option<SessionUser>, CacheError>;
}

fn session_key(id: &SessionId) -> String {
    format!("{SESSION_KEY_PREFIX}{}", id.as_str())
}

/// Redis-backed sessions: `SET session:<id> <json> EX <ttl>`.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: ConnectionManager,
}

impl RedisSessionStore {
    /// Create a session store on an existing connection.
    #[must_use]
    pub const fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save_session(
        &self,
        id: &SessionId,
        user: &SessionUser,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let payload = serde_json::to_string(user)?;
        let mut con = self.redis.clone();
        let (): () = con
            .set_ex(session_key(id), payload, ttl.as_secs().max(1))
            .await?;
        Ok(())
    }

    async fn session_by_id(&self, id: &SessionId) -> Result<Option<SessionUser>, CacheError> {
        let mut con = self.redis.clone();
        let raw: Option<String> = con.get(session_key(id)).await?;
        Ok(raw.map(|raw| serde_json::from_str(&raw)).transpose()?)
    }
}

#[derive(Clone)]
struct SessionEntry {
    user: SessionUser,
    ttl: Duration,
}

struct SessionExpiry;

impl Expiry<String, SessionEntry> for SessionExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &SessionEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process sessions with per-entry expiry.
#[derive(Clone)]
pub struct MemorySessionStore {
    sessions: Cache<String, SessionEntry>,
}

impl MemorySessionStore {
    /// Upper bound on live sessions kept in memory.
    const MAX_SESSIONS: u64 = 100_000;

    /// Create an empty session store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(Self::MAX_SESSIONS)
                .expire_after(SessionExpiry)
                .build(),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save_session(
        &self,
        id: &SessionId,
        user: &SessionUser,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.sessions
            .insert(
                id.as_str().to_owned(),
                SessionEntry {
                    user: user.clone(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn session_by_id(&self, id: &SessionId) -> Result<Option<SessionUser>, CacheError> {
        Ok(self.sessions.get(id.as_str()).await.map(|entry| entry.user))
    }
}
