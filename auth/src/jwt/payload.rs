use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claims carried by an access token.
///
/// Timestamps are serialized as RFC 3339 strings with sub-second precision so
/// a verified payload is identical to the one that was signed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payload {
    /// Subject (username the token was issued to)
    #[serde(rename = "sub")]
    pub subject: String,

    pub issued_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}

impl Payload {
    /// Create a payload issued now and valid for `valid_for`.
    ///
    /// # Arguments
    /// * `subject` - Identity the token is issued to
    /// * `valid_for` - Lifetime of the token; zero or negative yields an already expired payload
    ///
    /// Returns `None` when the expiry is not representable.
    pub fn new(subject: impl ToString, valid_for: Duration) -> Option<Self> {
        Self::issued_at(subject, Utc::now(), valid_for)
    }

    /// Create a payload with an explicit issuance time.
    pub fn issued_at(
        subject: impl ToString,
        issued_at: DateTime<Utc>,
        valid_for: Duration,
    ) -> Option<Self> {
        Some(Self {
            subject: subject.to_string(),
            issued_at,
            expires_at: issued_at.checked_add_signed(valid_for)?,
        })
    }

    /// Check if the payload is expired at `now`.
    ///
    /// A payload stops being valid at the instant `now` reaches `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Remaining lifetime at `now` (negative once expired).
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }
}
