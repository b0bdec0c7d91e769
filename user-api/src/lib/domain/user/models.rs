use std::fmt;
use std::str::FromStr;

use auth::Payload;
use chrono::DateTime;
use chrono::Utc;

use crate::user::errors::EmailError;
use crate::user::errors::NameError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UsernameError;

/// User aggregate entity.
///
/// Represents a registered user. The username is the identity of the user and
/// the subject of every access token issued to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: Username,
    pub email: EmailAddress,
    pub full_name: Option<PersonName>,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Username value type
///
/// Ensures username is 3-32 characters and contains only ASCII letters and digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 32;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 32 characters
    /// * `InvalidCharacters` - Contains non-alphanumeric characters
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Personal name (first, last or full name).
///
/// Surrounding whitespace is trimmed; the result must not be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MAX_LENGTH: usize = 100;

    /// # Errors
    /// * `Empty` - Name is blank
    /// * `TooLong` - Name longer than 100 characters
    pub fn new(field: &'static str, name: String) -> Result<Self, NameError> {
        let trimmed = name.trim();
        let length = trimmed.chars().count();

        if length == 0 {
            return Err(NameError::Empty { field });
        }
        if length > Self::MAX_LENGTH {
            return Err(NameError::TooLong {
                field,
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plaintext password supplied by a client.
///
/// Only lives for the duration of a request. Its `Debug` output is redacted so
/// it can never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 6;

    /// # Errors
    /// * `TooShort` - Password shorter than 6 characters
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        Ok(Self(password))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Command to create a new user with domain types
#[derive(Debug)]
pub struct CreateUserCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub password: Password,
    pub full_name: Option<PersonName>,
    pub first_name: PersonName,
    pub last_name: PersonName,
}

/// Command to update an existing user with optional validated fields.
///
/// Only provided fields are updated; the username is the user's identity and
/// cannot be changed.
#[derive(Debug, Default)]
pub struct UpdateUserCommand {
    pub email: Option<EmailAddress>,
    pub password: Option<Password>,
    pub full_name: Option<PersonName>,
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
}

impl UpdateUserCommand {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password.is_none()
            && self.full_name.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
    }
}

/// Credentials presented at login
#[derive(Debug)]
pub struct LoginCommand {
    pub username: Username,
    pub password: Password,
}

/// Successful login: the user and the access token issued to them
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub payload: Payload,
}
