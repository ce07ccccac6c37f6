use crate::{model::Gender, types::Timestamp};
use serde::{Deserialize, Deserializer, Serialize};

///
/// ExternalId
///
/// Identifier of the same performer in an external system.
/// Older exports call these `endpoint` / `stash_id`.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ExternalId {
    #[serde(alias = "endpoint")]
    pub source: String,

    #[serde(alias = "stash_id")]
    pub identifier: String,
}

impl ExternalId {
    pub fn new(source: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            identifier: identifier.into(),
        }
    }
}

///
/// PerformerRecord
///
/// One performer as it appears in the interchange format.
/// Read-only input to the pipeline; every field may be omitted on the wire.
/// Zero numbers and empty strings mean "not set".
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct PerformerRecord {
    pub name: String,
    #[serde(deserialize_with = "empty_gender_as_none")]
    pub gender: Option<Gender>,
    pub url: String,
    pub twitter: String,
    pub instagram: String,
    pub birthdate: String,
    pub ethnicity: String,
    pub country: String,
    pub eye_color: String,
    pub height: String,
    pub measurements: String,
    pub fake_tits: String,
    pub career_length: String,
    pub tattoos: String,
    pub piercings: String,
    pub aliases: Vec<String>,
    pub favorite: bool,
    pub tags: Vec<String>,
    pub image: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub rating: f64,
    pub details: String,
    pub death_date: String,
    pub hair_color: String,
    pub weight: i32,
    pub stash_ids: Vec<ExternalId>,
    pub ignore_auto_tag: bool,
}

impl PerformerRecord {
    /// Minimal record carrying only the natural key.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Decode one record from its JSON interchange form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// Exporters write `"gender": ""` for unset values.
fn empty_gender_as_none<'de, D>(deserializer: D) -> Result<Option<Gender>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;

    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_interchange_record() {
        let json = r#"{
            "name": "Jane Doe",
            "gender": "FEMALE",
            "birthdate": "1990-01-01",
            "aliases": ["JD", "Janie"],
            "tags": ["blonde", "tall"],
            "rating": 4.5,
            "weight": 55,
            "stash_ids": [{ "endpoint": "https://stashdb.org/graphql", "stash_id": "abc-123" }],
            "created_at": "2021-03-04T05:06:07Z",
            "updated_at": "2021-03-05T05:06:07Z"
        }"#;

        let record = PerformerRecord::from_json(json).unwrap();

        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.gender, Some(Gender::Female));
        assert_eq!(record.tags, vec!["blonde", "tall"]);
        assert_eq!(record.aliases.len(), 2);
        assert_eq!(
            record.stash_ids,
            vec![ExternalId::new("https://stashdb.org/graphql", "abc-123")]
        );
        assert_eq!(record.created_at.get(), 1_614_834_367);
        assert!(record.image.is_empty());
        assert!(record.death_date.is_empty());
    }

    #[test]
    fn empty_gender_decodes_as_unset() {
        let record = PerformerRecord::from_json(r#"{ "name": "X", "gender": "" }"#).unwrap();

        assert_eq!(record.gender, None);
    }

    #[test]
    fn unknown_gender_is_a_decode_error() {
        assert!(PerformerRecord::from_json(r#"{ "name": "X", "gender": "ROBOT" }"#).is_err());
    }

    #[test]
    fn new_style_external_ids_decode() {
        let record = PerformerRecord::from_json(
            r#"{ "name": "X", "stash_ids": [{ "source": "tpdb", "identifier": "42" }] }"#,
        )
        .unwrap();

        assert_eq!(record.stash_ids, vec![ExternalId::new("tpdb", "42")]);
    }
}
