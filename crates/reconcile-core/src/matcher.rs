use crate::{
    context::Context,
    error::StoreError,
    model::{Entity, Performer},
    policy::NameMatch,
    store::NameFinder,
    types::Id,
};
use tracing::{debug, warn};

/// Look up an existing performer by natural key.
///
/// The first match wins; a store returning several matches is logged but
/// never treated as an error.
pub fn find_existing_id<S>(
    ctx: &Context,
    store: &S,
    name: &str,
    matching: NameMatch,
) -> Result<Option<Id<Performer>>, StoreError>
where
    S: NameFinder<Performer> + ?Sized,
{
    let existing = store.find_by_names(ctx, &[name.to_string()], matching)?;

    if existing.len() > 1 {
        warn!(
            kind = Performer::KIND,
            performer = name,
            matches = existing.len(),
            "natural key matched several entities; using the first"
        );
    }

    let id = existing.first().map(|named| named.id);
    debug!(kind = Performer::KIND, performer = name, existing = ?id, "identity check");

    Ok(id)
}

///
/// TESTS
///
