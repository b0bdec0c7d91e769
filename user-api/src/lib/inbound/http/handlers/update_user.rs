use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::non_blank;
use super::optional_name;
use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::Username;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// HTTP request body for updating a user (raw JSON)
///
/// Missing or blank fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<UpdateUserCommand, UserError> {
        Ok(UpdateUserCommand {
            email: non_blank(self.email).map(EmailAddress::new).transpose()?,
            password: non_blank(self.password).map(Password::new).transpose()?,
            full_name: optional_name("full_name", self.full_name)?,
            first_name: optional_name("first_name", self.first_name)?,
            last_name: optional_name("last_name", self.last_name)?,
        })
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(authenticated): Extension<AuthenticatedUser>,
    Path(user_name): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let username = Username::new(user_name).map_err(UserError::from)?;

    if username != authenticated.username {
        tracing::warn!(
            subject = %authenticated.username,
            target_user = %username,
            "Update of another user's profile rejected"
        );
        return Err(ApiError::Forbidden(
            "Not allowed to modify another user".to_string(),
        ));
    }

    let Json(body) = body?;
    let command = body.try_into_command()?;

    state
        .user_service
        .update_user(&username, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
