//! Store capabilities consumed by the importer.
//!
//! Each trait is deliberately narrow so the importer can run against any
//! backing store (or the in-memory one below). Every call takes the caller's
//! [`Context`] and must return promptly once it is canceled or past deadline.

mod memory;

pub use memory::{MemoryPerformerStore, MemoryTagStore, PerformerRow, StoreCall, StoreOp};

use crate::{
    context::Context,
    error::StoreError,
    model::{Entity, ExternalId, Named, Performer, Tag},
    policy::NameMatch,
    types::{Blob, Id},
};

///
/// NameFinder
///
/// Batch lookup by natural key. Returns only the names that exist; the
/// order of the result is store-defined.
///

pub trait NameFinder<E: Entity> {
    fn find_by_names(
        &self,
        ctx: &Context,
        names: &[String],
        matching: NameMatch,
    ) -> Result<Vec<Named<E>>, StoreError>;
}

///
/// TagCreator
///

pub trait TagCreator: NameFinder<Tag> {
    /// Insert a new tag; the store assigns its identity.
    fn create_tag(&self, ctx: &Context, tag: Tag) -> Result<Named<Tag>, StoreError>;
}

///
/// PerformerWriter
///
/// Everything the importer writes for a performer. The association calls
/// replace the performer's current set rather than appending to it.
///

pub trait PerformerWriter: NameFinder<Performer> {
    /// Insert a performer without identity and return the assigned one.
    fn create_performer(
        &self,
        ctx: &Context,
        performer: &Performer,
    ) -> Result<Id<Performer>, StoreError>;

    /// Overwrite the performer identified by `performer.id`.
    fn update_performer(&self, ctx: &Context, performer: &Performer) -> Result<(), StoreError>;

    fn update_tags(
        &self,
        ctx: &Context,
        id: Id<Performer>,
        tag_ids: &[Id<Tag>],
    ) -> Result<(), StoreError>;

    fn update_image(&self, ctx: &Context, id: Id<Performer>, image: &Blob)
    -> Result<(), StoreError>;

    fn update_external_ids(
        &self,
        ctx: &Context,
        id: Id<Performer>,
        external_ids: &[ExternalId],
    ) -> Result<(), StoreError>;
}
