use crate::{
    model::Entity,
    types::{Checksum, Date, Id, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// GenderParseError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
#[error("unknown gender '{0}'")]
pub struct GenderParseError(String);

///
/// Gender
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    TransgenderMale,
    TransgenderFemale,
    Intersex,
    NonBinary,
}

impl Gender {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::TransgenderMale => "TRANSGENDER_MALE",
            Self::TransgenderFemale => "TRANSGENDER_FEMALE",
            Self::Intersex => "INTERSEX",
            Self::NonBinary => "NON_BINARY",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = GenderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MALE" => Ok(Self::Male),
            "FEMALE" => Ok(Self::Female),
            "TRANSGENDER_MALE" => Ok(Self::TransgenderMale),
            "TRANSGENDER_FEMALE" => Ok(Self::TransgenderFemale),
            "INTERSEX" => Ok(Self::Intersex),
            "NON_BINARY" => Ok(Self::NonBinary),
            _ => Err(GenderParseError(s.to_string())),
        }
    }
}

///
/// Performer
///
/// Internal performer value built fresh by the field mapper for every import.
/// `id` is absent until the store assigns one; the update path gets a copy
/// with the existing identity via [`Performer::with_id`].
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Performer {
    pub id: Option<Id<Self>>,
    pub name: String,
    pub checksum: Checksum,
    pub gender: Option<Gender>,
    pub url: String,
    pub twitter: String,
    pub instagram: String,
    pub birthdate: Option<Date>,
    pub death_date: Option<Date>,
    pub ethnicity: String,
    pub country: String,
    pub eye_color: String,
    pub hair_color: String,
    pub height: String,
    pub weight: Option<i32>,
    pub measurements: String,
    pub fake_tits: String,
    pub career_length: String,
    pub tattoos: String,
    pub piercings: String,
    pub aliases: Vec<String>,
    pub details: String,
    pub rating: Option<f64>,
    pub favorite: bool,
    pub ignore_auto_tag: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Performer {
    /// Copy of this value carrying `id`; the receiver is left untouched.
    #[must_use]
    pub fn with_id(&self, id: Id<Self>) -> Self {
        Self {
            id: Some(id),
            ..self.clone()
        }
    }
}

impl Entity for Performer {
    const KIND: &'static str = "performer";
}

