//! Core types for the shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod name;
pub mod password;
pub mod price;
pub mod role;
pub mod token;

pub use email::{Email, EmailError};
pub use id::*;
pub use name::{CategoryName, Login, NameError};
pub use password::{Password, PasswordError};
pub use price::{Price, PriceError};
pub use role::{Role, UnknownRole};
pub use token::{TokenType, UnknownTokenType};
