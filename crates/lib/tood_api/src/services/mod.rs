//! Request-independent helpers used by handlers.

pub mod cookies;
pub mod form;
