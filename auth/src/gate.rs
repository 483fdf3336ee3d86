//! Framework-neutral bearer token gate.
//!
//! HTTP layers read the `Authorization` header, hand its value to
//! [`crate::Authenticator::authorize`] and turn a [`GateError`] into a 401
//! response carrying the error's `Display` text.

use thiserror::Error;

use crate::jwt::JwtError;

/// Prefix expected in front of the token in the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Reasons the gate refuses a request.
///
/// `Display` yields the message safe to send to the caller. For `Rejected`
/// the underlying verification failure is only reachable through the source
/// and must stay in logs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Missing or invalid authorization header")]
    MissingOrInvalidHeader,

    #[error("Token not provided")]
    TokenNotProvided,

    #[error("Invalid or expired token")]
    Rejected(#[source] JwtError),
}

/// Extract the bearer token from an `Authorization` header value.
///
/// # Errors
/// * `MissingOrInvalidHeader` - Header absent or not of the form `Bearer <token>`
/// * `TokenNotProvided` - Nothing follows the `Bearer ` prefix
pub fn bearer_token(header: Option<&str>) -> Result<&str, GateError> {
    let credentials = header
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or(GateError::MissingOrInvalidHeader)?;

    match credentials.split(' ').next() {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(GateError::TokenNotProvided),
    }
}
