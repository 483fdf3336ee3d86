use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthResponseData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    state
        .user_service
        .login(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|authenticated| {
            ApiSuccess::new(
                StatusCode::OK,
                AuthResponseData {
                    user: (&authenticated.user).into(),
                    token: authenticated.token,
                },
            )
        })
}

#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

impl LoginRequest {
    // Only the shape is checked here; the password policy applies to new passwords.
    fn try_into_command(self) -> Result<LoginCommand, ApiError> {
        let email = EmailAddress::new(self.email)
            .map_err(|e| ApiError::UnprocessableEntity(format!("Invalid email: {}", e)))?;

        if self.password.is_empty() {
            return Err(ApiError::UnprocessableEntity(
                "Password is required".to_string(),
            ));
        }

        Ok(LoginCommand {
            email,
            password: self.password,
        })
    }
}
