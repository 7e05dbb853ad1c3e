//! Session resolution for the HTTP gates.

use std::sync::Arc;

use thiserror::Error;

use coledzh_shop_core::UserId;

use crate::cache::{CacheError, SessionStore};
use crate::models::{SessionId, SessionUser};

/// Why a session did not authorize a request.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Unknown or expired session id.
    #[error("session not found")]
    NotFound,

    /// Session is valid but does not belong to an admin.
    #[error("admin role required")]
    NotAdmin,

    /// Session store could not be reached.
    #[error("session store error: {0}")]
    Store(#[from] CacheError),
}

/// Resolves session ids to their stored user snapshots.
pub struct SessionService {
    sessions: Arc<dyn SessionStore>,
}

impl SessionService {
    /// Create a new session service.
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    /// Look up the snapshot behind a session id.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` for unknown or expired ids.
    pub async fn resolve(&self, id: &SessionId) -> Result<SessionUser, SessionError> {
        self.sessions
            .session_by_id(id)
            .await?
            .ok_or(SessionError::NotFound)
    }

    /// Accept only sessions that belong to an admin.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAdmin` for a valid non-admin session.
    pub async fn validate_admin_session(&self, id: &SessionId) -> Result<(), SessionError> {
        let user = self.resolve(id).await?;
        if user.role.is_admin() {
            Ok(())
        } else {
            Err(SessionError::NotAdmin)
        }
    }

    /// Accept any live session and return its owner.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` for unknown or expired ids.
    pub async fn validate_user_session(&self, id: &SessionId) -> Result<UserId, SessionError> {
        self.resolve(id).await.map(|user| user.id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use coledzh_shop_core::Role;

    use super::*;
    use crate::cache::MemorySessionStore;
    use crate::testing::{email, login};

    async fn service_with(role: Role) -> (SessionService, SessionId, UserId) {
        let store = Arc::new(MemorySessionStore::new());
        let id = SessionId::generate();
        let user = SessionUser {
            id: UserId::generate(),
            login: login("someone"),
            email: email("someone@shop.test"),
            role,
        };
        store
            .save_session(&id, &user, Duration::from_secs(60))
            .await
            .unwrap();
        (SessionService::new(store), id, user.id)
    }

    #[tokio::test]
    async fn test_user_session_yields_owner() {
        let (service, id, user_id) = service_with(Role::User).await;
        assert_eq!(service.validate_user_session(&id).await.unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_admin_gate_rejects_user() {
        let (service, id, _) = service_with(Role::User).await;
        assert!(matches!(
            service.validate_admin_session(&id).await,
            Err(SessionError::NotAdmin)
        ));
    }

    #[tokio::test]
    async fn test_admin_gate_accepts_admin() {
        let (service, id, _) = service_with(Role::Admin).await;
        assert!(service.validate_admin_session(&id).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let (service, _, _) = service_with(Role::Admin).await;
        let unknown = SessionId::generate();
        assert!(matches!(
            service.validate_user_session(&unknown).await,
            Err(SessionError::NotFound)
        ));
    }
}
