//! Business logic services.
//!
//! Services depend only on store traits (`Arc<dyn ...>`), never on concrete
//! backends, so each can be exercised with in-memory fakes.

pub mod auth;
pub mod cart;
pub mod category;
pub mod mail;
pub mod password;
pub mod product;
pub mod session;
pub mod token;

pub use auth::{AuthError, AuthService};
pub use cart::{CartError, CartService};
pub use category::{CacheWrite, CategoryCreated, CategoryError, CategoryService};
pub use mail::{DeliveryError, LogVerificationSender, VerificationSender};
pub use password::{Argon2Verifier, CredentialVerifier, HashError};
pub use product::{ProductError, ProductService};
pub use session::{SessionError, SessionService};
pub use token::{EmailVerifier, TokenError, TokenService};
