//! Request handlers.

pub mod auth;
pub mod health;
pub mod menu;
pub mod reviews;
pub mod sitemap;
pub mod upload;
