//! Authentication: login credential verification, server sessions, and the
//! request gate that guards mutating operations.

pub mod credential;
pub mod gate;
pub mod session;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The login credential failed signature, audience, issuer or expiry checks.
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// No usable session: missing, malformed, tampered, expired or revoked.
    #[error("Unauthenticated")]
    Unauthenticated,

    /// The issuer's key set could not be retrieved.
    #[error("Key set unavailable: {0}")]
    KeySet(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
