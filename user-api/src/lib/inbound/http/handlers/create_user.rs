use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::optional_name;
use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let Json(body) = body?;

    state
        .user_service
        .create_user(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for creating a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateUserRequest {
    user_name: String,
    email: String,
    password: String,
    #[serde(default)]
    full_name: Option<String>,
    first_name: String,
    last_name: String,
}

impl CreateUserRequest {
    fn try_into_command(self) -> Result<CreateUserCommand, UserError> {
        Ok(CreateUserCommand {
            username: Username::new(self.user_name)?,
            email: EmailAddress::new(self.email)?,
            password: Password::new(self.password)?,
            full_name: optional_name("full_name", self.full_name)?,
            first_name: PersonName::new("first_name", self.first_name)?,
            last_name: PersonName::new("last_name", self.last_name)?,
        })
    }
}
