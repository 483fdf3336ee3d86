//! Authentication utilities library
//!
//! Provides the authentication core shared by services:
//! - Password hashing (bcrypt by default, Argon2id supported), offloaded to
//!   the blocking pool from async code
//! - JWT identity token issuance and verification
//! - Bearer token gate decision for inbound requests
//!
//! Configuration is built once at startup ([`AuthConfig`]) and owned by an
//! [`Authenticator`]; nothing here reads the environment.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{HashAlgorithm, PasswordHasher};
//!
//! let hasher = PasswordHasher::with_algorithm(HashAlgorithm::Bcrypt { cost: 4 });
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("other_password", &hash));
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{IdentityClaim, JwtHandler, SigningSecret};
//!
//! let secret = SigningSecret::new("secret_key_at_least_32_bytes_long!").unwrap();
//! let handler = JwtHandler::new(&secret);
//! let claim = IdentityClaim::new("user123", "alice@example.com");
//! let token = handler.issue(&claim).unwrap();
//! assert_eq!(handler.verify(&token).unwrap(), claim);
//! ```
//!
//! ## Request Gate
//! ```
//! use auth::{AuthConfig, Authenticator, GateError, IdentityClaim};
//!
//! let config = AuthConfig::from_secret("secret_key_at_least_32_bytes_long!").unwrap();
//! let auth = Authenticator::new(config);
//!
//! let claim = IdentityClaim::new("user123", "alice@example.com");
//! let token = auth.generate_token(&claim).unwrap();
//!
//! let header = format!("Bearer {}", token);
//! assert_eq!(auth.authorize(Some(&header)), Ok(claim));
//! assert_eq!(auth.authorize(None), Err(GateError::MissingOrInvalidHeader));
//! ```

pub mod authenticator;
pub mod config;
pub mod gate;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use authenticator::StoredCredential;
pub use config::AuthConfig;
pub use config::ConfigurationError;
pub use config::SigningSecret;
pub use gate::GateError;
pub use jwt::IdentityClaim;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::HashAlgorithm;
pub use password::PasswordError;
pub use password::PasswordHasher;
