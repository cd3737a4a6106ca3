//! Identity and session domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity claims extracted from a verified login credential.
///
/// Produced once per login and carried unchanged inside the session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaims {
    /// Stable user id assigned by the identity provider (`sub`).
    pub subject: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub picture_url: Option<String>,
}

impl IdentityClaims {
    /// Name shown next to content authored by this identity.
    ///
    /// Falls back to the email address, then to a placeholder.
    pub fn author_name(&self) -> String {
        [self.display_name.as_deref(), self.email.as_deref()]
            .into_iter()
            .flatten()
            .find(|n| !n.trim().is_empty())
            .unwrap_or("anonymous")
            .to_string()
    }
}

/// A resolved server session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub claims: IdentityClaims,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
