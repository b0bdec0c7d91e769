use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_name): Path<String>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let username = Username::new(user_name).map_err(UserError::from)?;

    state
        .user_service
        .get_user_by_username(&username)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
