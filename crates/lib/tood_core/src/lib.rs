//! # tood_core
//!
//! Core domain logic for Tood: identity credentials, sessions, reviews and
//! per-venue rating aggregation.

pub mod auth;
pub mod backend;
pub mod migrate;
pub mod models;
pub mod reviews;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
