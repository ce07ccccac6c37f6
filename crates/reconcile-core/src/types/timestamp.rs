use chrono::{DateTime, Utc};
use derive_more::{Display, From};
use serde::{Deserialize, Deserializer, Serialize, de};
use thiserror::Error as ThisError;

///
/// TimestampParseError
///

#[derive(Debug, ThisError)]
pub enum TimestampParseError {
    #[error("timestamp parse error: {0}")]
    Format(#[from] chrono::ParseError),

    #[error("timestamp before epoch: {0}")]
    BeforeEpoch(String),
}

///
/// Timestamp
/// (in seconds)
///

#[derive(
    Clone, Copy, Debug, Default, Display, Eq, From, PartialEq, Hash, Ord, PartialOrd, Serialize,
)]
#[repr(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const EPOCH: Self = Self(u64::MIN);

    /// Construct from seconds.
    #[must_use]
    pub const fn from_seconds(secs: u64) -> Self {
        Self(secs)
    }

    #[allow(clippy::cast_sign_loss)]
    pub fn parse_rfc3339(s: &str) -> Result<Self, TimestampParseError> {
        let dt = DateTime::parse_from_rfc3339(s)?;
        let ts = dt.timestamp();
        if ts < 0 {
            return Err(TimestampParseError::BeforeEpoch(s.to_string()));
        }

        Ok(Self(ts as u64))
    }

    /// Parse the interchange representation.
    ///
    /// Empty strings are the epoch, bare integers are seconds, everything
    /// else must be RFC 3339.
    pub fn parse_flexible(s: &str) -> Result<Self, TimestampParseError> {
        if s.is_empty() {
            return Ok(Self::EPOCH);
        }

        // Try integer seconds
        if let Ok(n) = s.parse::<u64>() {
            return Ok(Self(n));
        }

        Self::parse_rfc3339(s)
    }

    /// Current wall-clock timestamp in seconds.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn now() -> Self {
        Self(Utc::now().timestamp().max(0) as u64)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Seconds(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Seconds(n) => Ok(Self(n)),
            Repr::Text(s) => Self::parse_flexible(&s).map_err(de::Error::custom),
        }
    }
}

///
/// TESTS
///
