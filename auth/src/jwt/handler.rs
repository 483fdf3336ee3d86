use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::IdentityClaim;
use super::claims::TokenClaims;
use super::errors::JwtError;
use crate::config::SigningSecret;
use crate::config::DEFAULT_TOKEN_TTL_HOURS;

/// JWT token handler for issuing and verifying identity tokens.
///
/// Uses HS256 (HMAC with SHA-256). Token lifecycle is `issued -> valid ->
/// expired`; there is no revocation.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl JwtHandler {
    /// Create a new JWT handler signing with `secret`.
    ///
    /// Tokens issued through [`JwtHandler::issue`] are valid for one day.
    pub fn new(secret: &SigningSecret) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
            default_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        }
    }

    /// Override the validity window used by [`JwtHandler::issue`].
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Issue a token for `claim` with the default validity window.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, claim: &IdentityClaim) -> Result<String, JwtError> {
        self.issue_with_ttl(claim, self.default_ttl)
    }

    /// Issue a token for `claim` valid for `ttl` from now.
    ///
    /// A zero or negative `ttl` yields a token that is already expired.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed or the expiry is out of range
    pub fn issue_with_ttl(
        &self,
        claim: &IdentityClaim,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let claims = TokenClaims::new(claim, Utc::now(), ttl)
            .ok_or_else(|| JwtError::EncodingFailed("Token expiry out of range".to_string()))?;
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded identity.
    ///
    /// Expiry is checked against local wall-clock time with no leeway, and only
    /// after the signature has been verified.
    ///
    /// # Errors
    /// * `TokenInvalid` - Malformed token, bad signature, unexpected algorithm
    ///   or missing `exp`
    /// * `TokenExpired` - Current time is at or past `exp`
    pub fn verify(&self, token: &str) -> Result<IdentityClaim, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| JwtError::TokenInvalid(e.to_string()))?;

        if token_data.claims.is_expired(Utc::now().timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(token_data.claims.into_identity())
    }

    /// Decode token without validation (for inspection only).
    ///
    /// # Returns
    /// Embedded identity, or `None` if the token cannot be decoded
    ///
    /// # Security Warning
    /// This does NOT validate the signature or expiry. Never trust its output
    /// for authorization decisions.
    pub fn decode(&self, token: &str) -> Option<IdentityClaim> {
        let mut validation = Validation::new(self.algorithm);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<IdentityClaim>(token, &self.decoding_key, &validation)
            .ok()
            .map(|token_data| token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    fn handler() -> JwtHandler {
        JwtHandler::new(&SigningSecret::new(SECRET).unwrap())
    }

    fn test_claim() -> IdentityClaim {
        IdentityClaim::new("user-123", "test@example.com")
    }

    fn replace_char(segment: &str, index: usize) -> String {
        segment
            .chars()
            .enumerate()
            .map(|(i, c)| {
                if i != index {
                    c
                } else if c == 'A' {
                    'B'
                } else {
                    'A'
                }
            })
            .collect()
    }

    #[test]
    fn test_issue_produces_three_segments() {
        let token = handler().issue(&test_claim()).expect("Failed to issue token");

        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_issue_and_verify() {
        let handler = handler();
        let claim = test_claim();

        let token = handler.issue(&claim).expect("Failed to issue token");
        let verified = handler.verify(&token).expect("Failed to verify token");

        assert_eq!(verified.id, claim.id);
        assert_eq!(verified.email, claim.email);
    }

    #[test]
    fn test_different_claims_produce_different_tokens() {
        let handler = handler();

        let first = handler
            .issue(&IdentityClaim::new("user-1", "user1@test.com"))
            .unwrap();
        let second = handler
            .issue(&IdentityClaim::new("user-2", "user2@test.com"))
            .unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_default_ttl_is_one_day() {
        let handler = handler();
        let token = handler.issue(&test_claim()).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        let claims = decode::<TokenClaims>(&token, &handler.decoding_key, &validation)
            .unwrap()
            .claims;

        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_verify_expired_token() {
        let handler = handler();
        let token = handler
            .issue_with_ttl(&test_claim(), Duration::seconds(-1))
            .unwrap();

        assert_eq!(handler.verify(&token), Err(JwtError::TokenExpired));
    }

    #[test]
    fn test_verify_zero_ttl_token_is_expired() {
        let handler = handler();
        let token = handler
            .issue_with_ttl(&test_claim(), Duration::zero())
            .unwrap();

        assert_eq!(handler.verify(&token), Err(JwtError::TokenExpired));
    }

    #[test]
    fn test_issue_with_unrepresentable_ttl_fails() {
        let handler = handler();

        let result = handler.issue_with_ttl(&test_claim(), Duration::days(200_000_000));

        assert!(matches!(result, Err(JwtError::EncodingFailed(_))));
    }

    #[test]
    fn test_verify_invalid_token() {
        let handler = handler();

        assert!(matches!(
            handler.verify("invalid-token"),
            Err(JwtError::TokenInvalid(_))
        ));
        assert!(matches!(
            handler.verify("invalid.token.here"),
            Err(JwtError::TokenInvalid(_))
        ));
        assert!(matches!(handler.verify(""), Err(JwtError::TokenInvalid(_))));
    }

    #[test]
    fn test_verify_tampered_signature() {
        let handler = handler();
        let token = handler.issue(&test_claim()).unwrap();
        let (message, signature) = token.rsplit_once('.').unwrap();

        for index in 0..signature.chars().count() {
            let tampered = format!("{}.{}", message, replace_char(signature, index));
            assert!(
                matches!(handler.verify(&tampered), Err(JwtError::TokenInvalid(_))),
                "mutating signature character {} must invalidate the token",
                index
            );
        }
    }

    #[test]
    fn test_verify_tampered_payload() {
        let handler = handler();
        let token = handler.issue(&test_claim()).unwrap();
        let segments: Vec<&str> = token.split('.').collect();

        let forged_payload = {
            let other = handler
                .issue(&IdentityClaim::new("admin", "admin@example.com"))
                .unwrap();
            other.split('.').nth(1).unwrap().to_string()
        };
        let tampered = format!("{}.{}.{}", segments[0], forged_payload, segments[2]);

        assert!(matches!(
            handler.verify(&tampered),
            Err(JwtError::TokenInvalid(_))
        ));
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let issuer = JwtHandler::new(
            &SigningSecret::new("secret1_at_least_32_bytes_long_key!").unwrap(),
        );
        let verifier = JwtHandler::new(
            &SigningSecret::new("secret2_at_least_32_bytes_long_key!").unwrap(),
        );

        let token = issuer.issue(&test_claim()).unwrap();

        assert!(matches!(
            verifier.verify(&token),
            Err(JwtError::TokenInvalid(_))
        ));
    }

    #[test]
    fn test_verify_rejects_algorithm_mismatch() {
        let handler = handler();
        let claims = TokenClaims::new(&test_claim(), Utc::now(), Duration::hours(1)).unwrap();
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            handler.verify(&token),
            Err(JwtError::TokenInvalid(_))
        ));
    }

    #[test]
    fn test_verify_rejects_token_without_expiry() {
        let handler = handler();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &json!({ "id": "user-123", "email": "test@example.com" }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            handler.verify(&token),
            Err(JwtError::TokenInvalid(_))
        ));
    }

    #[test]
    fn test_verify_strips_extra_payload_fields() {
        let handler = handler();
        let exp = Utc::now().timestamp() + 3600;
        let token = encode(
            &Header::new(Algorithm::HS256),
            &json!({
                "id": "user-123",
                "email": "test@example.com",
                "exp": exp,
                "role": "admin"
            }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(handler.verify(&token).unwrap(), test_claim());
    }

    #[test]
    fn test_decode_without_verification() {
        let issuer = JwtHandler::new(
            &SigningSecret::new("secret1_at_least_32_bytes_long_key!").unwrap(),
        );
        let inspector = handler();

        let token = issuer.issue(&test_claim()).unwrap();

        // Signature does not match the inspector's key, decode still succeeds
        assert_eq!(inspector.decode(&token), Some(test_claim()));
    }

    #[test]
    fn test_decode_expired_token() {
        let handler = handler();
        let token = handler
            .issue_with_ttl(&test_claim(), Duration::hours(-2))
            .unwrap();

        assert_eq!(handler.decode(&token), Some(test_claim()));
    }

    #[test]
    fn test_decode_garbage() {
        let handler = handler();

        assert_eq!(handler.decode("garbage"), None);
        assert_eq!(handler.decode("invalid.token.here"), None);
    }
}
