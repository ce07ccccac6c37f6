use crate::types::Id;
use serde::{Deserialize, Serialize};

///
/// Entity
///
/// Marker for store-backed entity kinds.
/// `KIND` labels log lines, metrics and store diagnostics.
///

pub trait Entity {
    const KIND: &'static str;
}

///
/// Named
///
/// Identity plus natural key, as returned by name lookups and reference
/// creation. Resolved references are held in this form for the duration of
/// one import only.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(bound = "")]
pub struct Named<E> {
    pub id: Id<E>,
    pub name: String,
}

impl<E> Named<E> {
    pub fn new(id: Id<E>, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
