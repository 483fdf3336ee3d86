use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Identity carried inside a token.
///
/// The only identity data a token may hold: never a password verifier or a
/// plaintext secret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityClaim {
    /// Opaque account identifier
    pub id: String,

    /// Account email address
    pub email: String,
}

impl IdentityClaim {
    /// Create a new identity claim.
    pub fn new(id: impl ToString, email: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            email: email.into(),
        }
    }
}

/// Full token payload: identity plus validity window (Unix timestamps).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub id: String,
    pub email: String,

    /// Issued at
    pub iat: i64,

    /// Expiration time
    pub exp: i64,
}

impl TokenClaims {
    /// Build the payload for `identity`, issued at `issued_at` and valid for `ttl`.
    ///
    /// Returns `None` when the expiry falls outside the representable date range.
    pub fn new(
        identity: &IdentityClaim,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Option<Self> {
        let expires_at = issued_at.checked_add_signed(ttl)?;

        Some(Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    /// Check if token is expired.
    ///
    /// A token is expired from the second of its `exp` onward.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    /// Drop the validity window, keeping only the identity.
    pub fn into_identity(self) -> IdentityClaim {
        IdentityClaim {
            id: self.id,
            email: self.email,
        }
    }
}
