//! Third-party login credential verification.
//!
//! Login credentials are Google-style OpenID Connect ID tokens: RS256 JWTs
//! signed by the issuer, whose public keys are published as a JWK set.
//! Every credential is verified for signature, audience, issuer and expiry;
//! claims are never trusted from an unverified decode.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::AuthError;
use crate::models::auth::IdentityClaims;

/// Google's published signing keys for ID tokens.
pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Issuer values Google places in ID tokens.
pub const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Key set cache lifetime when the issuer sends no `max-age`.
const DEFAULT_KEYS_TTL: Duration = Duration::from_secs(60 * 60);

/// Upper bound on how long a fetched key set is trusted.
const MAX_KEYS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Minimum interval between forced key set refreshes.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

// =============================================================================
// Key sources
// =============================================================================

/// Supplies the issuer's current public keys.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Current key set. `refresh` asks the source to bypass any cache.
    async fn keys(&self, refresh: bool) -> Result<Arc<JwkSet>, AuthError>;
}

/// A fixed key set.
pub struct StaticKeySource {
    keys: Arc<JwkSet>,
}

impl StaticKeySource {
    pub fn new(keys: JwkSet) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }

    /// Parse a JWK set document (`{"keys": [...]}`).
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let keys: JwkSet =
            serde_json::from_str(json).map_err(|e| AuthError::KeySet(format!("jwks parse: {e}")))?;
        Ok(Self::new(keys))
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn keys(&self, _refresh: bool) -> Result<Arc<JwkSet>, AuthError> {
        Ok(Arc::clone(&self.keys))
    }
}

struct CachedKeys {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
    ttl: Duration,
}

impl CachedKeys {
    /// The cached set, if it may still be served. A forced refresh is
    /// answered from the cache while the set is younger than `cooldown`.
    fn usable(&self, refresh: bool, cooldown: Duration) -> Option<Arc<JwkSet>> {
        let age = self.fetched_at.elapsed();
        let fresh = if refresh { age < cooldown } else { age < self.ttl };
        fresh.then(|| Arc::clone(&self.keys))
    }
}

/// Fetches the issuer's JWK set over HTTP and caches it for the
/// `Cache-Control: max-age` the issuer advertises.
///
/// Fetches are serialized and never hold the cache lock, so lookups against
/// a valid cache do not wait on the network. Forced refreshes (unknown
/// `kid`) fetch at most once per refresh cooldown.
pub struct RemoteKeySource {
    http: reqwest::Client,
    url: String,
    refresh_cooldown: Duration,
    cache: RwLock<Option<CachedKeys>>,
    fetch_lock: Mutex<()>,
}

impl RemoteKeySource {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            refresh_cooldown: MIN_REFRESH_INTERVAL,
            cache: RwLock::new(None),
            fetch_lock: Mutex::new(()),
        }
    }

    /// Override the minimum interval between forced refreshes.
    pub fn with_refresh_cooldown(mut self, cooldown: Duration) -> Self {
        self.refresh_cooldown = cooldown;
        self
    }

    async fn cached(&self, refresh: bool) -> Option<Arc<JwkSet>> {
        self.cache
            .read()
            .await
            .as_ref()
            .and_then(|c| c.usable(refresh, self.refresh_cooldown))
    }

    async fn fetch(&self) -> Result<CachedKeys, AuthError> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::KeySet(format!("jwks fetch: {e}")))?;

        let ttl = resp
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(DEFAULT_KEYS_TTL)
            .min(MAX_KEYS_TTL);

        let keys: JwkSet = resp
            .json()
            .await
            .map_err(|e| AuthError::KeySet(format!("jwks parse: {e}")))?;

        info!(url = %self.url, keys = keys.keys.len(), ttl_secs = ttl.as_secs(), "fetched issuer key set");
        Ok(CachedKeys {
            keys: Arc::new(keys),
            fetched_at: Instant::now(),
            ttl,
        })
    }
}

#[async_trait]
impl KeySource for RemoteKeySource {
    async fn keys(&self, refresh: bool) -> Result<Arc<JwkSet>, AuthError> {
        if let Some(keys) = self.cached(refresh).await {
            return Ok(keys);
        }

        let _fetching = self.fetch_lock.lock().await;
        // Another caller may have fetched while this one waited.
        if let Some(keys) = self.cached(refresh).await {
            return Ok(keys);
        }

        let fresh = self.fetch().await?;
        let keys = Arc::clone(&fresh.keys);
        *self.cache.write().await = Some(fresh);
        Ok(keys)
    }
}

/// Extract `max-age` from a `Cache-Control` header value.
pub fn parse_max_age(header: &str) -> Option<Duration> {
    header
        .split(',')
        .map(str::trim)
        .find_map(|directive| directive.strip_prefix("max-age="))
        .and_then(|secs| secs.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

// =============================================================================
// Verifier
// =============================================================================

/// Claims read from a verified ID token. `aud`, `iss` and `exp` are checked
/// by the JWT validation itself.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// Verifies login credentials against the issuer's key set.
pub struct CredentialVerifier {
    keys: Arc<dyn KeySource>,
    issuers: Vec<String>,
}

impl CredentialVerifier {
    /// Create a verifier accepting tokens from any of `issuers`.
    pub fn new(keys: Arc<dyn KeySource>, issuers: Vec<String>) -> Self {
        Self { keys, issuers }
    }

    /// Verifier for Google ID tokens.
    pub fn google(keys: Arc<dyn KeySource>) -> Self {
        Self::new(keys, GOOGLE_ISSUERS.iter().map(|s| s.to_string()).collect())
    }

    /// Verify `credential` and extract its identity claims.
    ///
    /// Fails with [`AuthError::InvalidCredential`] when the signature cannot
    /// be validated against the issuer's keys, the audience is not exactly
    /// `expected_audience`, the issuer is not accepted, or the token has
    /// expired. Fails with [`AuthError::KeySet`] when the keys cannot be
    /// retrieved at all.
    pub async fn verify(
        &self,
        credential: &str,
        expected_audience: &str,
    ) -> Result<IdentityClaims, AuthError> {
        if expected_audience.is_empty() {
            warn!("no client id configured; rejecting credential");
            return Err(AuthError::InvalidCredential("audience not configured".into()));
        }

        let header = decode_header(credential)
            .map_err(|e| AuthError::InvalidCredential(format!("malformed token: {e}")))?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::InvalidCredential(format!(
                "unsupported algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidCredential("missing key id".into()))?;

        let jwk = self.find_key(&kid).await?;
        let key = DecodingKey::from_jwk(&jwk)
            .map_err(|e| AuthError::InvalidCredential(format!("unusable key {kid}: {e}")))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[expected_audience]);
        validation.set_issuer(self.issuers.as_slice());
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);
        validation.leeway = 0;

        let data = decode::<IdTokenClaims>(credential, &key, &validation).map_err(|e| {
            warn!(kid = %kid, error = %e, "credential rejected");
            AuthError::InvalidCredential(e.to_string())
        })?;

        let claims = data.claims;
        debug!(sub = %claims.sub, "credential verified");
        Ok(IdentityClaims {
            subject: claims.sub,
            display_name: claims.name,
            email: claims.email,
            picture_url: claims.picture,
        })
    }

    /// Look up `kid`, refreshing the key set once if it is unknown
    /// (the issuer may have rotated keys since the last fetch).
    async fn find_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        let keys = self.keys.keys(false).await?;
        if let Some(jwk) = keys.find(kid) {
            return Ok(jwk.clone());
        }
        let keys = self.keys.keys(true).await?;
        keys.find(kid)
            .cloned()
            .ok_or_else(|| AuthError::InvalidCredential(format!("unknown key id {kid}")))
    }
}
