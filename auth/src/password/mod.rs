pub mod errors;
pub mod hasher;

pub use errors::PasswordError;
pub use hasher::HashAlgorithm;
pub use hasher::PasswordHasher;
pub use hasher::DEFAULT_BCRYPT_COST;
pub use hasher::MAX_BCRYPT_COST;
pub use hasher::MAX_BCRYPT_SECRET_BYTES;
pub use hasher::MIN_BCRYPT_COST;
pub use hasher::MIN_SECRET_LENGTH;
