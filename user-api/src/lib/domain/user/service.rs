use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Duration;
use chrono::Utc;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::Password;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
/// Password hashing and verification run on the blocking thread pool.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    access_token_ttl: Duration,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hashing and token issuance
    /// * `access_token_ttl` - Lifetime of every access token issued at login
    pub fn new(
        repository: Arc<UR>,
        authenticator: Arc<Authenticator>,
        access_token_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            authenticator,
            access_token_ttl,
        }
    }

    async fn hash_password(&self, password: Password) -> Result<String, UserError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(password.expose()))
            .await?
            .map_err(|e| UserError::Credential(e.to_string()))
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        let password_hash = self.hash_password(command.password).await?;

        let user = User {
            username: command.username,
            email: command.email,
            full_name: command.full_name,
            first_name: command.first_name,
            last_name: command.last_name,
            password_hash,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(username = %created_user.username, "User created");

        Ok(created_user)
    }

    async fn get_user_by_username(&self, username: &Username) -> Result<User, UserError> {
        self.repository
            .find_by_username(username)
            .await?
            .ok_or(UserError::NotFound(username.to_string()))
    }

    async fn get_user_by_email(&self, email: &EmailAddress) -> Result<User, UserError> {
        self.repository
            .find_by_email(email)
            .await?
            .ok_or(UserError::NotFoundByEmail(email.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn update_user(
        &self,
        username: &Username,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self.get_user_by_username(username).await?;

        if command.is_empty() {
            return Ok(user);
        }

        if let Some(new_email) = command.email {
            user.email = new_email;
        }

        if let Some(new_full_name) = command.full_name {
            user.full_name = Some(new_full_name);
        }

        if let Some(new_first_name) = command.first_name {
            user.first_name = new_first_name;
        }

        if let Some(new_last_name) = command.last_name {
            user.last_name = new_last_name;
        }

        if let Some(new_password) = command.password {
            user.password_hash = self.hash_password(new_password).await?;
        }

        let updated_user = self.repository.update(user).await?;
        tracing::info!(username = %updated_user.username, "User updated");

        Ok(updated_user)
    }

    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, UserError> {
        let Some(user) = self.repository.find_by_username(&command.username).await? else {
            let authenticator = Arc::clone(&self.authenticator);
            let password = command.password;
            tokio::task::spawn_blocking(move || authenticator.reject_unknown(password.expose()))
                .await?;

            tracing::info!(username = %command.username, "Login rejected: unknown user");
            return Err(UserError::InvalidCredentials);
        };

        let authenticator = Arc::clone(&self.authenticator);
        let password_hash = user.password_hash.clone();
        let subject = user.username.as_str().to_string();
        let ttl = self.access_token_ttl;

        let result = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(command.password.expose(), &password_hash, &subject, ttl)
        })
        .await?
        .map_err(|e| match e {
            AuthenticationError::InvalidCredentials => {
                tracing::info!(username = %user.username, "Login rejected: wrong password");
                UserError::InvalidCredentials
            }
            AuthenticationError::PasswordError(err) => UserError::Credential(err.to_string()),
            AuthenticationError::JwtError(err) => UserError::TokenIssuance(err.to_string()),
        })?;

        tracing::info!(
            username = %user.username,
            expires_at = %result.payload.expires_at,
            "Access token issued"
        );

        Ok(LoginOutcome {
            user,
            access_token: result.access_token,
            payload: result.payload,
        })
    }
}
