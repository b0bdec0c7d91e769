use thiserror::Error;

/// Error type for JWT operations.
///
/// Verification failures are split so callers can tell an expired token
/// (prompt a new login) from a forged or corrupted one (reject outright).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Signing key too short: minimum {min} bytes, got {actual}")]
    InvalidKey { min: usize, actual: usize },

    #[error("Token lifetime out of range: {0}")]
    InvalidLifetime(String),

    #[error("Failed to sign token: {0}")]
    SigningFailed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token is malformed: {0}")]
    Malformed(String),
}
