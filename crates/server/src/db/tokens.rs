//! Single-purpose tokens.

use async_trait::async_trait;
use sqlx::PgPool;

use coledzh_shop_core::{TokenType, UserId};

use super::RepositoryError;

/// Durable `(token, user, type)` records.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persist a freshly minted token.
    async fn save_token(
        &self,
        user_id: UserId,
        token: &str,
        token_type: TokenType,
    ) -> Result<(), RepositoryError>;

    /// Resolve the owner of a token minted for `token_type`.
    async fn user_id_by_token(
        &self,
        token: &str,
        token_type: TokenType,
    ) -> Result<Option<UserId>, RepositoryError>;

    /// Remove a token after it has been redeemed. Returns whether a row was removed.
    async fn delete_token(&self, token: &str, token_type: TokenType)
    -> Result<bool, RepositoryError>;
}

/// `PostgreSQL` implementation of [`TokenStore`].
#[derive(Clone)]
pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    /// Create a new token store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn save_token(
        &self,
        user_id: UserId,
        token: &str,
        token_type: TokenType,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO tokens (token, user_id, token_type) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(token_type.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "token"))?;
        Ok(())
    }

    async fn user_id_by_token(
        &self,
        token: &str,
        token_type: TokenType,
    ) -> Result<Option<UserId>, RepositoryError> {
        let user_id = sqlx::query_scalar(
            "SELECT user_id FROM tokens WHERE token = $1 AND token_type = $2",
        )
        .bind(token)
        .bind(token_type.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user_id)
    }

    async fn delete_token(
        &self,
        token: &str,
        token_type: TokenType,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM tokens WHERE token = $1 AND token_type = $2")
            .bind(token)
            .bind(token_type.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
