use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;
use super::payload::Payload;

/// JWT token handler for issuing and verifying access tokens.
///
/// Uses HS256 (HMAC with SHA-256). The handler is stateless: tokens are never
/// stored, and replacing the secret invalidates every token issued before.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Minimum secret length accepted for HS256 (256 bits).
    pub const MIN_SECRET_LEN: usize = 32;

    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Errors
    /// * `InvalidKey` - Secret is shorter than [`Self::MIN_SECRET_LEN`] bytes
    pub fn new(secret: &[u8]) -> Result<Self, JwtError> {
        if secret.len() < Self::MIN_SECRET_LEN {
            return Err(JwtError::InvalidKey {
                min: Self::MIN_SECRET_LEN,
                actual: secret.len(),
            });
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        })
    }

    /// Issue a token for `subject` valid for `valid_for` from now.
    ///
    /// # Returns
    /// Encoded token together with the payload it carries
    ///
    /// # Errors
    /// * `InvalidLifetime` - Expiry time is out of range
    /// * `SigningFailed` - Token encoding failed
    pub fn create_token(
        &self,
        subject: &str,
        valid_for: Duration,
    ) -> Result<(String, Payload), JwtError> {
        let payload = Payload::new(subject, valid_for)
            .ok_or_else(|| JwtError::InvalidLifetime(format!("{valid_for}")))?;
        let token = self.encode(&payload)?;

        Ok((token, payload))
    }

    /// Verify a token and return the payload it carries.
    ///
    /// The signature is checked before anything else; expiry is only
    /// reported for tokens whose signature is valid.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not match (wrong key, tampering, wrong algorithm)
    /// * `Expired` - Signature valid but the token is past its expiry
    /// * `Malformed` - Token cannot be decoded into a payload
    pub fn verify_token(&self, token: &str) -> Result<Payload, JwtError> {
        let payload: Payload = self.decode(token)?;

        if payload.is_expired(Utc::now()) {
            return Err(JwtError::Expired);
        }

        Ok(payload)
    }

    /// Encode claims into a JWT token.
    ///
    /// # Errors
    /// * `SigningFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::SigningFailed(e.to_string()))
    }

    /// Decode a JWT token and check its signature.
    ///
    /// Registered time claims are not validated here; [`Self::verify_token`]
    /// applies the expiry rule of [`Payload`].
    ///
    /// # Errors
    /// * `InvalidSignature` - Token signature or algorithm is invalid
    /// * `Malformed` - Token structure or claims cannot be decoded
    pub fn decode<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.leeway = 0;

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName => JwtError::InvalidSignature,
                _ => JwtError::Malformed(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    fn handler() -> JwtHandler {
        JwtHandler::new(SECRET).expect("valid secret")
    }

    #[test]
    fn test_create_and_verify() {
        let handler = handler();

        let (token, issued) = handler
            .create_token("alice1", Duration::hours(1))
            .expect("Failed to create token");
        assert!(!token.is_empty());

        let payload = handler.verify_token(&token).expect("Failed to verify token");
        assert_eq!(payload.subject, "alice1");
        assert_eq!(payload, issued);
    }

    #[test]
    fn test_zero_duration_token_is_expired() {
        let handler = handler();

        let (token, _) = handler
            .create_token("alice1", Duration::zero())
            .expect("Failed to create token");

        assert_eq!(handler.verify_token(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_elapsed_token_is_expired() {
        let handler = handler();

        let (token, _) = handler
            .create_token("alice1", Duration::minutes(-5))
            .expect("Failed to create token");

        assert_eq!(handler.verify_token(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!").unwrap();
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!").unwrap();

        let (token, _) = handler1
            .create_token("alice1", Duration::hours(1))
            .expect("Failed to create token");

        assert_eq!(handler2.verify_token(&token), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_expired_token_with_wrong_secret_reports_signature() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!").unwrap();
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!").unwrap();

        let (token, _) = handler1
            .create_token("alice1", Duration::zero())
            .expect("Failed to create token");

        assert_eq!(handler2.verify_token(&token), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_verify_garbage() {
        let handler = handler();

        for token in ["", "invalid", "invalid.token.here", "a.b", "...."] {
            let result = handler.verify_token(token);
            assert!(
                matches!(result, Err(JwtError::Malformed(_))),
                "{token:?} gave {result:?}"
            );
        }
    }

    #[test]
    fn test_verify_truncated_token() {
        let handler = handler();
        let (token, _) = handler.create_token("alice1", Duration::hours(1)).unwrap();

        let truncated = &token[..token.len() - 5];
        assert!(matches!(
            handler.verify_token(truncated),
            Err(JwtError::InvalidSignature) | Err(JwtError::Malformed(_))
        ));

        let without_signature = &token[..token.rfind('.').unwrap()];
        assert!(matches!(
            handler.verify_token(without_signature),
            Err(JwtError::Malformed(_))
        ));
    }

    #[test]
    fn test_verify_flipped_bytes_never_valid() {
        let handler = handler();
        let (token, _) = handler.create_token("alice1", Duration::hours(1)).unwrap();

        for index in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            if bytes[index] == b'.' {
                continue;
            }
            bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();

            let result = handler.verify_token(&tampered);
            assert!(
                matches!(
                    result,
                    Err(JwtError::InvalidSignature) | Err(JwtError::Malformed(_))
                ),
                "flipping byte {index} gave {result:?}"
            );
        }
    }

    #[test]
    fn test_create_token_with_unrepresentable_lifetime() {
        let handler = handler();

        let result = handler.create_token("alice1", Duration::days(365 * 300_000));
        assert!(matches!(result, Err(JwtError::InvalidLifetime(_))));
    }

    #[test]
    fn test_verify_other_algorithm_is_rejected() {
        let handler = handler();
        let payload = Payload::new("alice1", Duration::hours(1)).unwrap();
        let token = encode(
            &Header::new(Algorithm::HS512),
            &payload,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(handler.verify_token(&token), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_verify_unsigned_token_is_rejected() {
        let handler = handler();
        // {"alg":"none","typ":"JWT"}.{"sub":"alice1"}.
        let token = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.eyJzdWIiOiJhbGljZTEifQ.";

        assert!(handler.verify_token(token).is_err());
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let result = JwtHandler::new(b"too-short");
        assert!(matches!(
            result,
            Err(JwtError::InvalidKey { min: 32, actual: 9 })
        ));
    }
}
