use crate::{
    model::Entity,
    types::{Id, Timestamp},
};
use serde::{Deserialize, Serialize};

///
/// Tag
///
/// Reference entity attached to performers by name.
/// Names are unique within a store.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Tag {
    pub id: Option<Id<Self>>,
    pub name: String,
    pub ignore_auto_tag: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Tag {
    /// Default attributes for a tag auto-created during import.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Timestamp::now();

        Self {
            id: None,
            name: name.into(),
            ignore_auto_tag: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Tag {
    const KIND: &'static str = "tag";
}
