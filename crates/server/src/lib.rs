//! coledzh shop server library.
//!
//! Accounts with email verification, cookie sessions, a category catalogue
//! mirrored in a cache, products and per-user carts. Exposed as a library so
//! the CLI can reuse the stores and services.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
mod testing;
