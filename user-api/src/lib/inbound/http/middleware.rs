use auth::JwtError;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use http::header::AUTHORIZATION;
use http::HeaderMap;
use thiserror::Error;

use crate::domain::user::models::Username;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extension type to store the authenticated user in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub username: Username,
}

/// Why no bearer credential could be extracted from a request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MissingCredentialError {
    #[error("Missing Authorization header")]
    Absent,

    #[error("Authorization header is not valid text")]
    NotText,

    #[error("Invalid Authorization header format. Expected: Bearer <token>")]
    NotBearer,

    #[error("Empty bearer token")]
    Empty,
}

/// Middleware that validates bearer tokens and adds the user to request extensions.
///
/// Every failure ends the request with a single 401 response; the wrapped
/// handler never runs.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).map_err(|e| {
        tracing::debug!(reason = %e, "Request rejected without credential");
        ApiError::Unauthorized(e.to_string())
    })?;

    let payload = state.authenticator.validate_token(token).map_err(|e| match e {
        JwtError::Expired => {
            tracing::info!("Expired access token presented");
            ApiError::Unauthorized("Token has expired, please log in again".to_string())
        }
        other => {
            tracing::warn!(error = %other, "Access token rejected");
            ApiError::Unauthorized("Not allowed".to_string())
        }
    })?;

    let username = Username::new(payload.subject.clone()).map_err(|e| {
        tracing::error!(error = %e, "Token subject is not a valid username");
        ApiError::Unauthorized("Not allowed".to_string())
    })?;

    tracing::debug!(
        subject = %username,
        remaining_secs = payload.remaining(Utc::now()).num_seconds(),
        "Request authenticated"
    );

    req.extensions_mut().insert(AuthenticatedUser { username });

    Ok(next.run(req).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The prefix is matched before anything is sliced off, so short or absent
/// headers are rejected rather than indexed into.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, MissingCredentialError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(MissingCredentialError::Absent)?
        .to_str()
        .map_err(|_| MissingCredentialError::NotText)?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(MissingCredentialError::NotBearer)?
        .trim();

    if token.is_empty() {
        return Err(MissingCredentialError::Empty);
    }

    Ok(token)
}
