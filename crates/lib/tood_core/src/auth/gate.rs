//! Request gate: the single authorization check in front of every
//! mutating operation.

use std::sync::Arc;

use super::AuthError;
use super::session::SessionManager;
use crate::models::auth::IdentityClaims;

/// Resolves a request's session token to identity claims, or fails with
/// [`AuthError::Unauthenticated`]. Performs no I/O and has no side effects.
#[derive(Clone)]
pub struct RequestGate {
    sessions: Arc<SessionManager>,
}

impl RequestGate {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    /// Authorize a request carrying `token` (the session cookie value, if any).
    pub fn authorize(&self, token: Option<&str>) -> Result<IdentityClaims, AuthError> {
        self.sessions.resolve(token)
    }
}
