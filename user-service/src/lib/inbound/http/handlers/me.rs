use auth::IdentityClaim;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiSuccess;

/// Identity of the caller, as attached by the authentication middleware.
pub async fn me(Extension(identity): Extension<IdentityClaim>) -> ApiSuccess<IdentityClaim> {
    ApiSuccess::new(StatusCode::OK, identity)
}
