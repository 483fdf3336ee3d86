use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::net::SocketAddr;
use std::time::Duration;

use auth::GateError;
use axum::extract::ConnectInfo;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::inbound::http::rate_limit::AuthRateLimiter;
use crate::inbound::http::router::AppState;

const TOO_MANY_ATTEMPTS_MESSAGE: &str = "Too many authentication attempts, please try again later";

/// Middleware that validates bearer tokens and adds the caller's identity to
/// request extensions.
///
/// Handlers behind it read the identity with `Extension<auth::IdentityClaim>`.
/// Every refusal is a 401 with an `{"error": ...}` body and a
/// `WWW-Authenticate: Bearer` challenge.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let identity = state.authenticator.authorize(authorization).map_err(|e| {
        match &e {
            GateError::Rejected(reason) => {
                tracing::warn!(reason = %reason, "JWT validation failed");
            }
            _ => {
                tracing::debug!(error = %e, "Request without usable bearer token");
            }
        }
        unauthorized(&e)
    })?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

fn unauthorized(error: &GateError) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
        Json(json!({
            "error": error.to_string()
        })),
    )
        .into_response()
}

/// Middleware that caps register and login attempts per client address.
///
/// The address comes from the connection's `ConnectInfo`; requests without it
/// share a single budget.
pub async fn limit_auth_attempts(
    State(limiter): State<AuthRateLimiter>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if let Err(retry_after) = limiter.try_acquire(client) {
        tracing::warn!(
            client = %client,
            path = %req.uri().path(),
            retry_after_secs = retry_after.as_secs(),
            "Authentication rate limit exceeded"
        );
        return Err(too_many_attempts(retry_after));
    }

    Ok(next.run(req).await)
}

fn too_many_attempts(retry_after: Duration) -> Response {
    // Round up so clients never retry a second early
    let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);

    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, HeaderValue::from(seconds))],
        Json(json!({
            "error": TOO_MANY_ATTEMPTS_MESSAGE
        })),
    )
        .into_response()
}
