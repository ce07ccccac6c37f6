use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// PolicyParseError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
#[error("unknown missing-reference policy '{0}' (expected fail, create_missing or ignore)")]
pub struct PolicyParseError(String);

///
/// MissingRefPolicy
///
/// What the resolver does with reference names the store does not know.
/// Chosen once by the caller for a whole import and never changed mid-way.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRefPolicy {
    /// Abort the import, naming every missing reference.
    #[default]
    Fail,

    /// Create each missing reference with default attributes.
    #[serde(alias = "create")]
    CreateMissing,

    /// Drop missing names and continue with the ones that exist.
    Ignore,
}

impl MissingRefPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::CreateMissing => "create_missing",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for MissingRefPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingRefPolicy {
    type Err = PolicyParseError;

    // Accepts the legacy upper-case exporter names as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "create" | "create_missing" => Ok(Self::CreateMissing),
            "ignore" => Ok(Self::Ignore),
            _ => Err(PolicyParseError(s.to_string())),
        }
    }
}

///
/// NameMatch
///
/// Case handling for natural-key lookups.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatch {
    #[default]
    Exact,
    IgnoreCase,
}

impl NameMatch {
    #[must_use]
    pub fn matches(self, stored: &str, wanted: &str) -> bool {
        match self {
            Self::Exact => stored == wanted,
            Self::IgnoreCase => stored.to_lowercase() == wanted.to_lowercase(),
        }
    }
}

///
/// TESTS
///
