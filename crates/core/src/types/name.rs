//! Human-facing names: user logins and category names.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Login`] or [`CategoryName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Fewer characters than allowed.
    #[error("must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// More characters than allowed.
    #[error("must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// A character outside the allowed set.
    #[error("contains invalid character {0:?}")]
    InvalidCharacter(char),
}

fn check_length(value: &str, min: usize, max: usize) -> Result<(), NameError> {
    let len = value.chars().count();
    if len < min {
        return Err(NameError::TooShort { min });
    }
    if len > max {
        return Err(NameError::TooLong { max });
    }
    Ok(())
}

/// A unique user handle.
///
/// 3-32 characters drawn from ASCII letters, digits, `_`, `-` and `.`.
///
/// ```
/// use coledzh_shop_core::Login;
///
/// assert!(Login::parse("alex_m").is_ok());
/// assert!(Login::parse("al").is_err());
/// assert!(Login::parse("alex m").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Login(String);

impl Login {
    /// Minimum login length.
    pub const MIN_LENGTH: usize = 3;
    /// Maximum login length.
    pub const MAX_LENGTH: usize = 32;

    /// Parse a `Login`.
    ///
    /// # Errors
    ///
    /// Returns a [`NameError`] when the length or character set is violated.
    pub fn parse(s: &str) -> Result<Self, NameError> {
        check_length(s, Self::MIN_LENGTH, Self::MAX_LENGTH)?;
        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
        {
            return Err(NameError::InvalidCharacter(bad));
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the login as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A category display name, trimmed, 3-64 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryName(String);

impl CategoryName {
    /// Minimum name length.
    pub const MIN_LENGTH: usize = 3;
    /// Maximum name length.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `CategoryName`.
    ///
    /// # Errors
    ///
    /// Returns a [`NameError`] when the trimmed name has the wrong length
    /// or contains control characters.
    pub fn parse(s: &str) -> Result<Self, NameError> {
        let trimmed = s.trim();
        check_length(trimmed, Self::MIN_LENGTH, Self::MAX_LENGTH)?;
        if let Some(bad) = trimmed.chars().find(|c| c.is_control()) {
            return Err(NameError::InvalidCharacter(bad));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_string_newtype {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = NameError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = NameError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_string_newtype!(Login);
impl_string_newtype!(CategoryName);
