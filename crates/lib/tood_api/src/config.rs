//! API server configuration.

use std::time::Duration;

use tood_core::auth::credential::{GOOGLE_ISSUERS, GOOGLE_JWKS_URL};
use tood_core::auth::session::resolve_session_secret;
use tood_core::backend::DEFAULT_TIMEOUT;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// OAuth client id; login credentials must carry it as their audience.
    pub google_client_id: String,
    /// URL of the credential issuer's JWK set.
    pub jwks_url: String,
    /// Accepted credential issuers (`iss`).
    pub credential_issuers: Vec<String>,
    /// Session token signing secret.
    pub session_secret: String,
    /// Base URL of the venue/menu backend.
    pub backend_url: String,
    /// Public site origin used for sitemap links.
    pub site_url: String,
    /// Timeout for outbound calls (backend and key set).
    pub upstream_timeout: Duration,
    /// Whether the session cookie is marked `Secure`.
    pub cookie_secure: bool,
    /// PostgreSQL connection URL; reviews are kept in memory when unset.
    pub database_url: Option<String>,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                 | Default                                      |
    /// |--------------------------|----------------------------------------------|
    /// | `BIND_ADDR`              | `127.0.0.1:3100`                             |
    /// | `GOOGLE_CLIENT_ID`       | empty (every login is rejected)              |
    /// | `GOOGLE_JWKS_URL`        | `https://www.googleapis.com/oauth2/v3/certs` |
    /// | `CREDENTIAL_ISSUERS`     | `accounts.google.com,https://accounts.google.com` |
    /// | `SESSION_SECRET` / `AUTH_SECRET` | generated & persisted to file        |
    /// | `BACKEND_API_URL`        | `http://localhost:8080`                      |
    /// | `SITE_URL`               | `https://watbab.vercel.app`                  |
    /// | `UPSTREAM_TIMEOUT_SECS`  | `10`                                         |
    /// | `COOKIE_SECURE`          | `true`                                       |
    /// | `DATABASE_URL`           | unset (in-memory reviews)                    |
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("BIND_ADDR", "127.0.0.1:3100"),
            google_client_id: env_or("GOOGLE_CLIENT_ID", ""),
            jwks_url: env_or("GOOGLE_JWKS_URL", GOOGLE_JWKS_URL),
            credential_issuers: std::env::var("CREDENTIAL_ISSUERS")
                .ok()
                .map(|v| split_list(&v))
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| GOOGLE_ISSUERS.iter().map(|s| s.to_string()).collect()),
            session_secret: resolve_session_secret(),
            backend_url: env_or("BACKEND_API_URL", "http://localhost:8080"),
            site_url: env_or("SITE_URL", "https://watbab.vercel.app")
                .trim_end_matches('/')
                .to_string(),
            upstream_timeout: std::env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
