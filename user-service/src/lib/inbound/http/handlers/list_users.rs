use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::Page;
use crate::domain::user::models::UserPage;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub skip: Option<u32>,
    pub take: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListUsersResponseData {
    pub users: Vec<UserData>,
    pub total: u64,
    pub skip: u32,
    pub take: u32,
}

impl From<UserPage> for ListUsersResponseData {
    fn from(page: UserPage) -> Self {
        Self {
            users: page.users.iter().map(UserData::from).collect(),
            total: page.total,
            skip: page.page.skip,
            take: page.page.take,
        }
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<ApiSuccess<ListUsersResponseData>, ApiError> {
    state
        .user_service
        .list_users(Page::new(query.skip, query.take))
        .await
        .map_err(ApiError::from)
        .map(|page| ApiSuccess::new(StatusCode::OK, page.into()))
}
