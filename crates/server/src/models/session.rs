//! Session-related types.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use coledzh_shop_core::{Email, Login, Role, UserId};

use super::User;

/// Generate an unguessable URL-safe token from 256 bits of randomness.
#[must_use]
pub fn opaque_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Opaque bearer identifier handed to the client in the session cookie.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Mint a new unguessable id.
    #[must_use]
    pub fn generate() -> Self {
        Self(opaque_token())
    }

    /// Returns the id as sent in the cookie.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bearer credential: only a prefix goes into logs.
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "SessionId({prefix}..)")
    }
}

/// Point-in-time snapshot of the user stored under a session id.
///
/// Never refreshed after login: a role change becomes visible only once
/// the session expires and the user logs in again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// User's database ID.
    pub id: UserId,
    /// Login at mint time.
    pub login: Login,
    /// Email at mint time.
    pub email: Email,
    /// Role at mint time.
    pub role: Role,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            login: user.login.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}
