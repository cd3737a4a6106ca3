//! Server session tokens.
//!
//! A session token is a compact HS256 JWT carrying the identity claims, a
//! random session id and a fixed expiry. Tokens are opaque to callers; the
//! only contract is that `resolve(issue(claims))` yields `claims` until the
//! token expires or is revoked.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, TimeZone, Utc};
use dashmap::DashMap;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::{IdentityClaims, Session};

/// Session lifetime: 24 hours.
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// Claims embedded in a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionTokenClaims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    picture: Option<String>,
    /// Session id, the revocation handle.
    sid: String,
    iat: i64,
    exp: i64,
}

/// An issued session token, to be stored in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Issues, resolves and revokes session tokens.
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    /// Revoked session ids mapped to their natural expiry (unix seconds).
    revoked: DashMap<String, i64>,
}

impl SessionManager {
    /// Create a manager signing with `secret` and the default 24h lifetime.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: Duration::seconds(SESSION_TTL_SECS),
            revoked: DashMap::new(),
        }
    }

    /// Session lifetime applied to newly issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a session for `claims`, expiring 24h from now.
    pub fn issue(&self, claims: &IdentityClaims) -> Result<SessionToken, AuthError> {
        self.issue_at(claims, Utc::now())
    }

    /// Issue a session as if the current time were `now`.
    pub fn issue_at(
        &self,
        claims: &IdentityClaims,
        now: DateTime<Utc>,
    ) -> Result<SessionToken, AuthError> {
        let token_claims = SessionTokenClaims {
            sub: claims.subject.clone(),
            name: claims.display_name.clone(),
            email: claims.email.clone(),
            picture: claims.picture_url.clone(),
            sid: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &token_claims,
            &self.encoding_key,
        )
        .map(SessionToken)
        .map_err(|e| AuthError::Internal(format!("session encode: {e}")))
    }

    /// Resolve a session token to its identity claims.
    pub fn resolve(&self, token: Option<&str>) -> Result<IdentityClaims, AuthError> {
        self.resolve_at(token, Utc::now())
    }

    /// Resolve a session token as if the current time were `now`.
    pub fn resolve_at(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<IdentityClaims, AuthError> {
        self.resolve_session_at(token, now).map(|s| s.claims)
    }

    /// Resolve a session token to the full [`Session`].
    ///
    /// Fails with [`AuthError::Unauthenticated`] when the token is absent,
    /// malformed, signed with another key, expired at `now`, or revoked.
    pub fn resolve_session_at(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Session, AuthError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthenticated)?;
        let claims = self.decode(token).ok_or(AuthError::Unauthenticated)?;

        if claims.exp <= now.timestamp() {
            debug!(sid = %claims.sid, "session expired");
            return Err(AuthError::Unauthenticated);
        }
        if self.revoked.contains_key(&claims.sid) {
            debug!(sid = %claims.sid, "session revoked");
            return Err(AuthError::Unauthenticated);
        }

        let issued_at = timestamp(claims.iat)?;
        let expires_at = timestamp(claims.exp)?;
        Ok(Session {
            claims: IdentityClaims {
                subject: claims.sub,
                display_name: claims.name,
                email: claims.email,
                picture_url: claims.picture,
            },
            issued_at,
            expires_at,
        })
    }

    /// Revoke a session. Revoking an absent or invalid token is a no-op.
    ///
    /// The caller is responsible for clearing the client's cookie; the
    /// revocation entry makes a retained copy of the token unusable too.
    pub fn revoke(&self, token: Option<&str>) {
        let Some(claims) = token.and_then(|t| self.decode(t)) else {
            return;
        };
        self.revoked.insert(claims.sid.clone(), claims.exp);
        info!(sid = %claims.sid, "session revoked");
        self.prune_revoked(Utc::now());
    }

    /// Drop revocation entries whose tokens have expired on their own.
    pub fn prune_revoked(&self, now: DateTime<Utc>) {
        let now = now.timestamp();
        self.revoked.retain(|_, exp| *exp > now);
    }

    /// Number of live revocation entries.
    pub fn revoked_count(&self) -> usize {
        self.revoked.len()
    }

    /// Spawn a periodic task pruning expired revocation entries.
    pub fn spawn_prune_task(
        self: &std::sync::Arc<Self>,
        every: std::time::Duration,
    ) -> tokio::task::JoinHandle<()> {
        let sessions = std::sync::Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                sessions.prune_revoked(Utc::now());
            }
        })
    }

    /// Verify signature and structure; expiry is checked by the caller
    /// against an explicit instant.
    fn decode(&self, token: &str) -> Option<SessionTokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        decode::<SessionTokenClaims>(token, &self.decoding_key, &validation)
            .ok()
            .map(|data| data.claims)
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, AuthError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or(AuthError::Unauthenticated)
}

/// Resolve the session signing secret: env var `SESSION_SECRET` →
/// `AUTH_SECRET` → persisted file.
pub fn resolve_session_secret() -> String {
    if let Ok(secret) = std::env::var("SESSION_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    if let Ok(secret) = std::env::var("AUTH_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    // Generate and persist
    let secret_path = session_secret_path();
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    match persist_secret(&secret_path, &secret) {
        Ok(()) => info!(path = %secret_path.display(), "generated new session secret"),
        Err(e) => warn!(
            path = %secret_path.display(),
            error = %e,
            "could not persist session secret; sessions will not survive a restart"
        ),
    }
    secret
}

fn persist_secret(path: &Path, secret: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, secret)
}

/// Path to the persisted session secret file.
fn session_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tood")
        .join("session-secret")
}
