//! coledzh shop core - Shared domain types.
//!
//! This crate provides the validated types used across the workspace:
//! - `server` - HTTP API, services, stores and session gates
//! - `cli` - Migrations and admin bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Every value that crosses a trust boundary is parsed
//! into one of these types before it reaches a service.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, credentials, names, roles and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
