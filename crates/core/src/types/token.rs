//! Token purposes.

use serde::{Deserialize, Serialize};

/// Error returned when a string names no supported [`TokenType`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("wrong token type: {0}")]
pub struct UnknownTokenType(pub String);

/// Purpose a stored token was minted for.
///
/// Tokens are looked up by `(token, type)`, so a token minted for one
/// purpose can never be redeemed for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Proves control of the email address given at registration.
    EmailVerification,
}

impl TokenType {
    /// Returns the name stored alongside the token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmailVerification => "email_verification",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TokenType {
    type Err = UnknownTokenType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email_verification" => Ok(Self::EmailVerification),
            _ => Err(UnknownTokenType(s.to_owned())),
        }
    }
}
