use chrono::Duration;
use secrecy::ExposeSecret;
use secrecy::SecretString;
use thiserror::Error;

use crate::password::HashAlgorithm;

/// Signing secrets shorter than this are accepted with a warning.
pub const MIN_RECOMMENDED_SECRET_LENGTH: usize = 32;

/// Default token validity window in hours (one day).
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Error raised while assembling authentication configuration.
///
/// Fatal: a process without a signing secret must not start issuing tokens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("JWT signing secret is missing or empty")]
    MissingSigningSecret,
}

/// Symmetric key used to sign and verify every token of the process.
///
/// `Debug` output is redacted.
#[derive(Debug)]
pub struct SigningSecret(SecretString);

impl SigningSecret {
    /// Wrap a signing secret loaded from configuration.
    ///
    /// # Errors
    /// * `MissingSigningSecret` - Secret is empty or whitespace only
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigurationError> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(ConfigurationError::MissingSigningSecret);
        }

        let length = secret.chars().count();
        if length < MIN_RECOMMENDED_SECRET_LENGTH {
            tracing::warn!(
                length,
                recommended = MIN_RECOMMENDED_SECRET_LENGTH,
                "JWT signing secret is shorter than recommended"
            );
        }

        Ok(Self(SecretString::from(secret)))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.expose_secret().as_bytes()
    }
}

/// Process-wide authentication settings.
///
/// Built once at startup and handed to [`crate::Authenticator::new`]; never
/// mutated afterwards.
#[derive(Debug)]
pub struct AuthConfig {
    pub signing_secret: SigningSecret,
    pub token_ttl: Duration,
    pub hash_algorithm: HashAlgorithm,
}

impl AuthConfig {
    /// Configuration with default token validity (1 day) and hashing (bcrypt, cost 12).
    pub fn new(signing_secret: SigningSecret) -> Self {
        Self {
            signing_secret,
            token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            hash_algorithm: HashAlgorithm::default(),
        }
    }

    /// Shorthand for [`SigningSecret::new`] followed by [`AuthConfig::new`].
    pub fn from_secret(secret: impl Into<String>) -> Result<Self, ConfigurationError> {
        SigningSecret::new(secret).map(Self::new)
    }

    /// Set the validity window of issued tokens.
    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }

    /// Set the algorithm for newly produced password verifiers.
    pub fn with_hash_algorithm(mut self, hash_algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = hash_algorithm;
        self
    }
}
