//! Token service: typed single-use tokens and email verification.

mod error;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use coledzh_shop_core::{TokenType, UserId};

pub use error::TokenError;

use crate::db::TokenStore;
use crate::models::session::opaque_token;
use crate::services::auth::AuthError;

/// The "mark this user verified" capability the token service delegates to.
///
/// Implemented by `AuthService`; depending on this narrow trait keeps the
/// token service from needing the whole auth service.
#[async_trait]
pub trait EmailVerifier: Send + Sync {
    /// Flip the user's verified flag.
    async fn mark_verified(&self, user_id: UserId) -> Result<(), AuthError>;
}

/// Token service.
pub struct TokenService {
    tokens: Arc<dyn TokenStore>,
    verifier: Arc<dyn EmailVerifier>,
}

impl TokenService {
    /// Create a new token service.
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenStore>, verifier: Arc<dyn EmailVerifier>) -> Self {
        Self { tokens, verifier }
    }

    /// Mint and persist a token of the given purpose for `user_id`.
    ///
    /// An unsupported purpose cannot be expressed as a `TokenType`, so this
    /// never yields `TokenError::WrongTokenType`. That variant guards the
    /// text boundary: callers holding a purpose as text parse it with
    /// `TokenType::from_str` and `?` the `UnknownTokenType` into it before
    /// anything is persisted.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Repository` if the token cannot be stored.
    pub async fn create_token(
        &self,
        user_id: UserId,
        token_type: TokenType,
    ) -> Result<String, TokenError> {
        let token = match token_type {
            TokenType::EmailVerification => opaque_token(),
        };
        self.tokens.save_token(user_id, &token, token_type).await?;

        debug!(user_id = %user_id, %token_type, "token created");
        Ok(token)
    }

    /// Redeem an email-verification token.
    ///
    /// The token is deleted once the owner is marked verified, so a second
    /// redemption fails with `TokenNotFound`. A failed delete is logged and
    /// does not fail the call; the owner is already verified and a replay
    /// of the surviving token is harmless.
    ///
    /// # Errors
    ///
    /// - `TokenError::TokenNotFound` for an unknown or already redeemed token
    /// - `TokenError::Verification` if the owner cannot be marked verified
    pub async fn verify_email(&self, token: &str) -> Result<(), TokenError> {
        let user_id = self
            .tokens
            .user_id_by_token(token, TokenType::EmailVerification)
            .await?
            .ok_or(TokenError::TokenNotFound)?;

        self.verifier.mark_verified(user_id).await?;

        match self
            .tokens
            .delete_token(token, TokenType::EmailVerification)
            .await
        {
            Ok(true) => {}
            Ok(false) => debug!(user_id = %user_id, "token redeemed concurrently"),
            Err(e) => warn!(user_id = %user_id, error = %e, "failed to delete redeemed token"),
        }

        info!(user_id = %user_id, "verification token redeemed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::cache::MemorySessionStore;
    use crate::db::RepositoryError;
    use crate::services::AuthService;
    use crate::testing::{MemoryTokenStore, MemoryUserStore, PlainVerifier, email, login, password};

    struct Fixture {
        users: Arc<MemoryUserStore>,
        tokens: Arc<MemoryTokenStore>,
        auth: Arc<AuthService>,
        service: TokenService,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(MemoryUserStore::default());
        let tokens = Arc::new(MemoryTokenStore::default());
        let auth = Arc::new(AuthService::new(
            users.clone(),
            Arc::new(MemorySessionStore::new()),
            Arc::new(PlainVerifier),
            Duration::from_secs(60),
        ));
        let service = TokenService::new(tokens.clone(), auth.clone());
        Fixture {
            users,
            tokens,
            auth,
            service,
        }
    }

    async fn register(f: &Fixture) -> UserId {
        f.auth
            .register(&login("buyer"), &email("buyer@example.com"), &password("secret"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_verify_marks_user_verified() {
        let f = fixture();
        let user_id = register(&f).await;

        let token = f
            .service
            .create_token(user_id, TokenType::EmailVerification)
            .await
            .unwrap();
        assert!(!token.is_empty());

        f.service.verify_email(&token).await.unwrap();
        assert!(f.users.by_id(user_id).unwrap().email_verified);
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let f = fixture();
        let user_id = register(&f).await;

        let a = f
            .service
            .create_token(user_id, TokenType::EmailVerification)
            .await
            .unwrap();
        let b = f
            .service
            .create_token(user_id, TokenType::EmailVerification)
            .await
            .unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_redeemed_token_cannot_be_replayed() {
        let f = fixture();
        let user_id = register(&f).await;
        let token = f
            .service
            .create_token(user_id, TokenType::EmailVerification)
            .await
            .unwrap();

        f.service.verify_email(&token).await.unwrap();
        let replay = f.service.verify_email(&token).await;

        assert!(matches!(replay, Err(TokenError::TokenNotFound)));
        assert_eq!(f.tokens.count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let f = fixture();
        let result = f.service.verify_email("no-such-token").await;
        assert!(matches!(result, Err(TokenError::TokenNotFound)));
    }

    /// Token store whose deletes always fail.
    struct UndeletableTokens(MemoryTokenStore);

    #[async_trait]
    impl TokenStore for UndeletableTokens {
        async fn save_token(
            &self,
            user_id: UserId,
            token: &str,
            token_type: TokenType,
        ) -> Result<(), RepositoryError> {
            self.0.save_token(user_id, token, token_type).await
        }

        async fn user_id_by_token(
            &self,
            token: &str,
            token_type: TokenType,
        ) -> Result<Option<UserId>, RepositoryError> {
            self.0.user_id_by_token(token, token_type).await
        }

        async fn delete_token(
            &self,
            _token: &str,
            _token_type: TokenType,
        ) -> Result<bool, RepositoryError> {
            Err(RepositoryError::DataCorruption("disk full".to_owned()))
        }
    }

    #[tokio::test]
    async fn test_failed_delete_still_reports_verified() {
        let users = Arc::new(MemoryUserStore::default());
        let tokens = Arc::new(UndeletableTokens(MemoryTokenStore::default()));
        let auth = Arc::new(AuthService::new(
            users.clone(),
            Arc::new(MemorySessionStore::new()),
            Arc::new(PlainVerifier),
            Duration::from_secs(60),
        ));
        let service = TokenService::new(tokens.clone(), auth.clone());
        let user_id = auth
            .register(&login("buyer"), &email("buyer@example.com"), &password("secret"))
            .await
            .unwrap();
        let token = service
            .create_token(user_id, TokenType::EmailVerification)
            .await
            .unwrap();

        service.verify_email(&token).await.unwrap();

        assert!(users.by_id(user_id).unwrap().email_verified);
        assert_eq!(tokens.0.count(), 1);
    }

    #[test]
    fn test_unsupported_type_is_wrong_token_type() {
        let err: TokenError = "password_reset".parse::<TokenType>().unwrap_err().into();
        assert!(matches!(err, TokenError::WrongTokenType(_)));
    }

    #[tokio::test]
    async fn test_token_for_deleted_owner_is_kept() {
        let f = fixture();
        let token = f
            .service
            .create_token(UserId::generate(), TokenType::EmailVerification)
            .await
            .unwrap();

        let result = f.service.verify_email(&token).await;

        assert!(matches!(
            result,
            Err(TokenError::Verification(AuthError::NotFound))
        ));
        assert_eq!(f.tokens.count(), 1);
    }
}
