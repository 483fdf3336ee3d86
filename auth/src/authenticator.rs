use secrecy::ExposeSecret;
use secrecy::SecretString;

use crate::config::AuthConfig;
use crate::gate;
use crate::gate::GateError;
use crate::jwt::IdentityClaim;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and JWT generation.
///
/// Provides high-level authentication operations by coordinating
/// password hashing, token handling and the request gate. Built once from an
/// [`AuthConfig`] and shared behind an `Arc`.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
}

/// Result of successful authentication.
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
}

/// Stored verifier of an account together with the identity it proves.
#[derive(Debug, Clone)]
pub struct StoredCredential {
    pub verifier: String,
    pub claim: IdentityClaim,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `config` - Signing secret, token validity and hashing settings
    ///
    /// # Returns
    /// Configured Authenticator instance
    pub fn new(config: AuthConfig) -> Self {
        Self {
            password_hasher: PasswordHasher::with_algorithm(config.hash_algorithm),
            jwt_handler: JwtHandler::new(&config.signing_secret)
                .with_default_ttl(config.token_ttl),
        }
    }

    /// Underlying password hasher (blocking API).
    pub fn password_hasher(&self) -> &PasswordHasher {
        &self.password_hasher
    }

    /// Underlying token handler.
    pub fn jwt_handler(&self) -> &JwtHandler {
        &self.jwt_handler
    }

    /// Compute the dummy verifier ahead of the first login.
    pub async fn warm_up(&self) {
        let hasher = self.password_hasher.clone();
        let result = tokio::task::spawn_blocking(move || {
            hasher.dummy_verifier();
        })
        .await;

        if let Err(e) = result {
            tracing::error!(error = %e, "Dummy verifier warm-up task failed");
        }
    }

    /// Hash a password for storage on the blocking thread pool.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Hashed password string
    ///
    /// # Errors
    /// * `InvalidInput` - Password is too short
    /// * `HashingFailed` - Hashing operation or its worker task failed
    pub async fn hash_secret(&self, password: &str) -> Result<String, PasswordError> {
        let hasher = self.password_hasher.clone();
        let password = SecretString::from(password.to_owned());

        tokio::task::spawn_blocking(move || hasher.hash(password.expose_secret()))
            .await
            .map_err(|e| PasswordError::HashingFailed(format!("Hashing task failed: {}", e)))?
    }

    /// Verify a password against a stored verifier on the blocking thread pool.
    ///
    /// # Returns
    /// True only if the password matches; false on mismatch, empty input,
    /// malformed verifier or worker failure
    pub async fn verify_secret(&self, password: &str, verifier: &str) -> bool {
        self.verify_offloaded(password, Some(verifier.to_owned())).await
    }

    /// Verify credentials and generate JWT token.
    ///
    /// When `credential` is `None` (no such account) the password is still
    /// checked against the dummy verifier, so unknown accounts and wrong
    /// passwords take the same time and yield the same error.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `credential` - Stored verifier and identity of the account, if any
    ///
    /// # Returns
    /// AuthenticationResult with access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Account unknown or password does not match
    /// * `JwtError` - Token generation failed
    pub async fn authenticate(
        &self,
        password: &str,
        credential: Option<&StoredCredential>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let verifier = credential.map(|c| c.verifier.clone());
        let is_valid = self.verify_offloaded(password, verifier).await;

        let claim = match credential {
            Some(credential) if is_valid => &credential.claim,
            _ => return Err(AuthenticationError::InvalidCredentials),
        };

        let access_token = self.jwt_handler.issue(claim)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Generate JWT token without password verification.
    ///
    /// Used right after registration, when the password was just set.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn generate_token(&self, claim: &IdentityClaim) -> Result<String, JwtError> {
        self.jwt_handler.issue(claim)
    }

    /// Validate JWT token and return its identity.
    ///
    /// # Errors
    /// * `TokenExpired` - Token is past its expiry
    /// * `TokenInvalid` - Token signature or structure is invalid
    pub fn validate_token(&self, token: &str) -> Result<IdentityClaim, JwtError> {
        self.jwt_handler.verify(token)
    }

    /// Decode a token without any verification. Never use for authorization.
    pub fn decode_token(&self, token: &str) -> Option<IdentityClaim> {
        self.jwt_handler.decode(token)
    }

    /// Gate decision for an inbound request.
    ///
    /// # Arguments
    /// * `authorization` - Raw `Authorization` header value, if present
    ///
    /// # Returns
    /// Identity to attach to the request context
    ///
    /// # Errors
    /// * `MissingOrInvalidHeader` - Header absent or not a bearer credential
    /// * `TokenNotProvided` - Bearer credential is empty
    /// * `Rejected` - Token failed verification
    pub fn authorize(&self, authorization: Option<&str>) -> Result<IdentityClaim, GateError> {
        let token = gate::bearer_token(authorization)?;

        self.jwt_handler.verify(token).map_err(GateError::Rejected)
    }

    async fn verify_offloaded(&self, password: &str, verifier: Option<String>) -> bool {
        let hasher = self.password_hasher.clone();
        let password = SecretString::from(password.to_owned());

        let result = tokio::task::spawn_blocking(move || match verifier {
            Some(verifier) => hasher.verify(password.expose_secret(), &verifier),
            None => hasher.verify(password.expose_secret(), hasher.dummy_verifier()),
        })
        .await;

        result.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Password verification task failed");
            false
        })
    }
}
