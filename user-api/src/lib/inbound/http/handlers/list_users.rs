use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::EmailAddress;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub email: Option<String>,
}

/// List all users, or the (at most one) user registered with `email`.
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<ApiSuccess<Vec<UserData>>, ApiError> {
    let users = match query.email {
        Some(email) => {
            let email = EmailAddress::new(email).map_err(UserError::from)?;
            match state.user_service.get_user_by_email(&email).await {
                Ok(user) => vec![user],
                Err(UserError::NotFoundByEmail(_)) => Vec::new(),
                Err(e) => return Err(e.into()),
            }
        }
        None => state.user_service.list_users().await?,
    };

    Ok(ApiSuccess::new(
        StatusCode::OK,
        users.iter().map(UserData::from).collect(),
    ))
}
