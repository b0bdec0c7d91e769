use chrono::Duration;

use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::Payload;
use crate::password::HashCost;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

const DECOY_PASSWORD: &str = "decoy-password-for-unknown-users";

/// Authentication coordinator combining password verification and JWT generation.
///
/// Built once at startup from the signing secret and the hashing cost, then
/// shared read-only between requests.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    decoy_hash: String,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
    /// Claims carried by `access_token`
    pub payload: Payload,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `cost` - Password hashing cost
    ///
    /// # Errors
    /// * `JwtError::InvalidKey` - Secret is too short
    /// * `PasswordError::InvalidCost` - Hashing cost is out of range
    pub fn new(jwt_secret: &[u8], cost: HashCost) -> Result<Self, AuthenticationError> {
        let password_hasher = PasswordHasher::new(cost)?;
        let decoy_hash = password_hasher.hash(DECOY_PASSWORD)?;

        Ok(Self {
            password_hasher,
            jwt_handler: JwtHandler::new(jwt_secret)?,
            decoy_hash,
        })
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue an access token for `subject`.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `subject` - Identity placed in the token
    /// * `valid_for` - Token lifetime
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is malformed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &str,
        valid_for: Duration,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        self.password_hasher
            .verify(password, stored_hash)
            .map_err(|e| match e {
                PasswordError::Mismatch => AuthenticationError::InvalidCredentials,
                other => AuthenticationError::PasswordError(other),
            })?;

        let (access_token, payload) = self.jwt_handler.create_token(subject, valid_for)?;

        Ok(AuthenticationResult {
            access_token,
            payload,
        })
    }

    /// Reject a login for a subject that does not exist.
    ///
    /// Verifies `password` against a hash of the configured cost so the call
    /// takes as long as a real mismatch.
    pub fn reject_unknown(&self, password: &str) -> AuthenticationError {
        let _ = self.password_hasher.verify(password, &self.decoy_hash);
        AuthenticationError::InvalidCredentials
    }

    /// Validate a token and return its payload.
    ///
    /// # Errors
    /// * `JwtError` - Token is expired, forged or malformed
    pub fn validate_token(&self, token: &str) -> Result<Payload, JwtError> {
        self.jwt_handler.verify_token(token)
    }
}
