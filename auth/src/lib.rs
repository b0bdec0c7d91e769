//! Authentication core.
//!
//! - Password hashing (Argon2id, salted, fixed cost)
//! - Access token issuance and verification (HS256 JWT)
//! - Authentication coordination for login flows
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{HashCost, PasswordHasher};
//!
//! let hasher = PasswordHasher::new(HashCost::default()).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).is_ok());
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::JwtHandler;
//! use chrono::Duration;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!").unwrap();
//! let (token, _) = handler.create_token("alice1", Duration::hours(1)).unwrap();
//! let payload = handler.verify_token(&token).unwrap();
//! assert_eq!(payload.subject, "alice1");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, HashCost};
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", HashCost::default()).unwrap();
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and generate token
//! let result = auth
//!     .authenticate("password123", &hash, "alice1", Duration::hours(1))
//!     .unwrap();
//!
//! // Validate token
//! let payload = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(payload.subject, "alice1");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::Payload;
pub use password::HashCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
