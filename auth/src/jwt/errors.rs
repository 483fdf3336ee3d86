use thiserror::Error;

/// Error type for JWT operations.
///
/// `TokenExpired` and `TokenInvalid` stay distinct here so logs can tell them
/// apart; the request gate answers both with the same message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token is invalid: {0}")]
    TokenInvalid(String),
}
