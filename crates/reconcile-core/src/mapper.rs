//! Field mapping from interchange records to internal performers.
//!
//! Mapping never touches the store. The only lossy rules are:
//! - a zero rating or weight is "not set" (an explicit zero cannot be imported)
//! - an empty or unparsable date is "not set", silently
//!
//! Images are decoded separately (see `image`) because their failures abort
//! the import.

use crate::{
    model::{Performer, PerformerRecord},
    types::{Checksum, Date},
};

/// Build the candidate performer for one record.
#[must_use]
pub fn map_performer(record: &PerformerRecord) -> Performer {
    Performer {
        id: None,
        name: record.name.clone(),
        checksum: Checksum::from_name(&record.name),
        gender: record.gender,
        url: record.url.clone(),
        twitter: record.twitter.clone(),
        instagram: record.instagram.clone(),
        birthdate: optional_date(&record.birthdate),
        death_date: optional_date(&record.death_date),
        ethnicity: record.ethnicity.clone(),
        country: record.country.clone(),
        eye_color: record.eye_color.clone(),
        hair_color: record.hair_color.clone(),
        height: record.height.clone(),
        weight: (record.weight != 0).then_some(record.weight),
        measurements: record.measurements.clone(),
        fake_tits: record.fake_tits.clone(),
        career_length: record.career_length.clone(),
        tattoos: record.tattoos.clone(),
        piercings: record.piercings.clone(),
        aliases: record.aliases.clone(),
        details: record.details.clone(),
        rating: optional_rating(record.rating),
        favorite: record.favorite,
        ignore_auto_tag: record.ignore_auto_tag,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

#[allow(clippy::float_cmp)]
fn optional_rating(rating: f64) -> Option<f64> {
    (rating != 0.0).then_some(rating)
}

fn optional_date(raw: &str) -> Option<Date> {
    if raw.is_empty() {
        return None;
    }

    Date::parse(raw)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{ExternalId, Gender},
        types::Timestamp,
    };
    use proptest::prelude::*;

    fn record() -> PerformerRecord {
        PerformerRecord {
            name: "Jane Doe".to_string(),
            gender: Some(Gender::Female),
            url: "https://example.com/jane".to_string(),
            aliases: vec!["JD".to_string()],
            country: "NZ".to_string(),
            favorite: true,
            stash_ids: vec![ExternalId::new("tpdb", "1")],
            created_at: Timestamp::from_seconds(100),
            updated_at: Timestamp::from_seconds(200),
            ..PerformerRecord::default()
        }
    }

    #[test]
    fn copies_scalar_fields_verbatim() {
        let performer = map_performer(&record());

        assert_eq!(performer.id, None);
        assert_eq!(performer.name, "Jane Doe");
        assert_eq!(performer.gender, Some(Gender::Female));
        assert_eq!(performer.url, "https://example.com/jane");
        assert_eq!(performer.aliases, vec!["JD"]);
        assert_eq!(performer.country, "NZ");
        assert!(performer.favorite);
        assert_eq!(performer.created_at, Timestamp::from_seconds(100));
        assert_eq!(performer.updated_at, Timestamp::from_seconds(200));
    }

    #[test]
    fn zero_rating_is_absent() {
        let performer = map_performer(&record());

        assert_eq!(performer.rating, None);
        assert_eq!(performer.weight, None);
    }

    #[test]
    fn non_zero_rating_and_weight_are_present() {
        let performer = map_performer(&PerformerRecord {
            rating: 4.5,
            weight: 61,
            ..record()
        });

        assert_eq!(performer.rating, Some(4.5));
        assert_eq!(performer.weight, Some(61));
    }

    #[test]
    fn invalid_birthdate_is_dropped_silently() {
        let performer = map_performer(&PerformerRecord {
            birthdate: "not-a-date".to_string(),
            ..record()
        });

        assert_eq!(performer.birthdate, None);
    }

    #[test]
    fn valid_dates_are_carried() {
        let performer = map_performer(&PerformerRecord {
            birthdate: "1990-01-01".to_string(),
            death_date: "2020-12".to_string(),
            ..record()
        });

        assert_eq!(performer.birthdate, Date::new_checked(1990, 1, 1));
        assert_eq!(performer.death_date, Date::new_checked(2020, 12, 1));
    }

    #[test]
    fn checksum_derives_from_name() {
        let a = map_performer(&record());
        let b = map_performer(&PerformerRecord {
            details: "different details".to_string(),
            ..record()
        });
        let c = map_performer(&PerformerRecord::named("John Doe"));

        assert_eq!(a.checksum, b.checksum);
        assert_ne!(a.checksum, c.checksum);
        assert_eq!(a.checksum, Checksum::from_name("Jane Doe"));
    }

    proptest! {
        #[test]
        fn non_zero_ratings_round_trip(rating in prop::num::f64::NORMAL) {
            let performer = map_performer(&PerformerRecord { rating, ..PerformerRecord::default() });

            prop_assert_eq!(performer.rating, Some(rating));
        }

        #[test]
        fn date_text_is_parsed_or_dropped(raw in ".{0,12}") {
            let expected = Date::parse(&raw);
            let performer = map_performer(&PerformerRecord { birthdate: raw, ..PerformerRecord::default() });

            prop_assert_eq!(performer.birthdate, expected);
        }
    }
}
