use std::sync::Arc;
use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;

/// Minimum number of characters accepted by [`PasswordHasher::hash`].
pub const MIN_SECRET_LENGTH: usize = 8;

/// Longest secret, in bytes, bcrypt can digest without truncation.
pub const MAX_BCRYPT_SECRET_BYTES: usize = 72;

/// Bcrypt work factor used unless configured otherwise (2^12 rounds).
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Lowest bcrypt cost a deployment may configure.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Highest bcrypt cost a deployment may configure.
pub const MAX_BCRYPT_COST: u32 = 14;

const DUMMY_SECRET: &str = "constant-effort-dummy-secret";

/// Algorithm used when producing new verifiers.
///
/// Verification never depends on this setting: every verifier carries its own
/// algorithm identifier and parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// bcrypt (`$2b$`) with the given cost factor.
    Bcrypt { cost: u32 },
    /// Argon2id (`$argon2id$`) with library default parameters.
    Argon2,
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        HashAlgorithm::Bcrypt {
            cost: DEFAULT_BCRYPT_COST,
        }
    }
}

/// Password hashing implementation.
///
/// Produces self-describing verifiers (modular crypt / PHC strings) with a
/// random salt, and verifies candidate secrets against any supported verifier.
///
/// Both operations are CPU-bound and deliberately slow. Async callers should go
/// through [`crate::Authenticator::hash_secret`] and
/// [`crate::Authenticator::verify_secret`], which run them on the blocking pool.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    algorithm: HashAlgorithm,
    dummy_verifier: Arc<OnceLock<String>>,
}

impl PasswordHasher {
    /// Create a password hasher with the default algorithm (bcrypt, cost 12).
    pub fn new() -> Self {
        Self::with_algorithm(HashAlgorithm::default())
    }

    /// Create a password hasher producing verifiers with `algorithm`.
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            dummy_verifier: Arc::new(OnceLock::new()),
        }
    }

    /// Algorithm used for newly produced verifiers.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hash a plaintext password securely.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// Verifier string embedding algorithm, parameters, salt and digest
    ///
    /// # Errors
    /// * `InvalidInput` - Password is empty or shorter than [`MIN_SECRET_LENGTH`]
    /// * `TooLong` - Password exceeds [`MAX_BCRYPT_SECRET_BYTES`] under bcrypt
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let length = password.chars().count();
        if length < MIN_SECRET_LENGTH {
            return Err(PasswordError::InvalidInput {
                min: MIN_SECRET_LENGTH,
                actual: length,
            });
        }

        if matches!(self.algorithm, HashAlgorithm::Bcrypt { .. })
            && password.len() > MAX_BCRYPT_SECRET_BYTES
        {
            return Err(PasswordError::TooLong {
                max: MAX_BCRYPT_SECRET_BYTES,
                actual: password.len(),
            });
        }

        self.hash_unchecked(password)
    }

    /// Verify a password against a stored verifier.
    ///
    /// The algorithm is taken from the verifier itself, so verifiers produced
    /// under an older algorithm or cost keep working.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored verifier
    ///
    /// # Returns
    /// True only if the password matches. Empty inputs, malformed verifiers and
    /// secrets too long for a bcrypt verifier yield false.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if password.is_empty() || hash.is_empty() {
            return false;
        }

        if hash.starts_with("$argon2") {
            Self::verify_argon2(password, hash)
        } else if hash.starts_with("$2") {
            Self::verify_bcrypt(password, hash)
        } else {
            tracing::warn!("Unrecognised password verifier format");
            false
        }
    }

    /// Verifier of an unknowable secret, produced with the configured algorithm.
    ///
    /// Login flows compare against it when no account matches, so that a
    /// missing account costs the same as a wrong password. Computed on first
    /// use and cached for the lifetime of the hasher (and its clones).
    pub fn dummy_verifier(&self) -> &str {
        self.dummy_verifier.get_or_init(|| {
            self.hash_unchecked(DUMMY_SECRET).unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to compute dummy password verifier");
                String::new()
            })
        })
    }

    fn hash_unchecked(&self, password: &str) -> Result<String, PasswordError> {
        match self.algorithm {
            HashAlgorithm::Bcrypt { cost } => bcrypt::hash(password, cost)
                .map_err(|e| PasswordError::HashingFailed(e.to_string())),
            HashAlgorithm::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);

                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| PasswordError::HashingFailed(e.to_string()))
            }
        }
    }

    fn verify_bcrypt(password: &str, hash: &str) -> bool {
        // bcrypt ignores everything past byte 72
        if password.len() > MAX_BCRYPT_SECRET_BYTES {
            return false;
        }

        bcrypt::verify(password, hash).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Malformed bcrypt verifier");
            false
        })
    }

    fn verify_argon2(password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed_hash) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Malformed argon2 verifier");
                false
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
