//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use coledzh_shop_core::{Email, Login, Role, UserId};

/// A shop account (domain type).
///
/// The password hash never lives on this type; stores hand it out
/// separately and only to the login path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Public handle, globally unique.
    pub login: Login,
    /// Verification target, globally unique.
    pub email: Email,
    /// Authorization role.
    pub role: Role,
    /// Whether the email has been verified.
    pub email_verified: bool,
}
