use crate::{
    context::Context,
    error::StoreError,
    model::{Entity, ExternalId, Named, Performer, Tag},
    policy::NameMatch,
    store::{NameFinder, PerformerWriter, TagCreator},
    types::{Blob, Id},
};
use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
};

///
/// StoreOp
///
/// Store operations that can be targeted by fault injection.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum StoreOp {
    FindTags,
    CreateTag,
    FindPerformers,
    CreatePerformer,
    UpdatePerformer,
    UpdateTags,
    UpdateImage,
    UpdateExternalIds,
}

///
/// StoreCall
///
/// Journal entry for one attempted store call, recorded before faults and
/// context checks apply.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreCall {
    FindTags { names: Vec<String> },
    CreateTag { name: String },
    FindPerformers { names: Vec<String> },
    CreatePerformer { name: String },
    UpdatePerformer { id: Option<Id<Performer>> },
    UpdateTags { id: Id<Performer>, tag_ids: Vec<Id<Tag>> },
    UpdateImage { id: Id<Performer>, len: usize },
    UpdateExternalIds { id: Id<Performer>, count: usize },
}

impl StoreCall {
    #[must_use]
    pub const fn op(&self) -> StoreOp {
        match self {
            Self::FindTags { .. } => StoreOp::FindTags,
            Self::CreateTag { .. } => StoreOp::CreateTag,
            Self::FindPerformers { .. } => StoreOp::FindPerformers,
            Self::CreatePerformer { .. } => StoreOp::CreatePerformer,
            Self::UpdatePerformer { .. } => StoreOp::UpdatePerformer,
            Self::UpdateTags { .. } => StoreOp::UpdateTags,
            Self::UpdateImage { .. } => StoreOp::UpdateImage,
            Self::UpdateExternalIds { .. } => StoreOp::UpdateExternalIds,
        }
    }
}

///
/// Fault
///

#[derive(Clone, Debug)]
struct Fault {
    // successful calls still allowed before the fault fires
    remaining: usize,
    error: StoreError,
}

///
/// Harness
///
/// Journal and fault table shared by both in-memory stores.
///

#[derive(Debug, Default)]
struct Harness {
    calls: RefCell<Vec<StoreCall>>,
    faults: RefCell<BTreeMap<StoreOp, Fault>>,
}

impl Harness {
    // Record the attempt, then apply the caller's context and any fault.
    fn enter(&self, ctx: &Context, call: StoreCall) -> Result<(), StoreError> {
        let op = call.op();
        self.calls.borrow_mut().push(call);

        ctx.check()?;

        let mut faults = self.faults.borrow_mut();
        if let Some(fault) = faults.get_mut(&op) {
            if fault.remaining == 0 {
                return Err(fault.error.clone());
            }
            fault.remaining -= 1;
        }

        Ok(())
    }

    fn fail_after(&self, op: StoreOp, successes: usize, error: StoreError) {
        self.faults.borrow_mut().insert(
            op,
            Fault {
                remaining: successes,
                error,
            },
        );
    }

    fn clear_faults(&self) {
        self.faults.borrow_mut().clear();
    }

    fn calls(&self) -> Vec<StoreCall> {
        self.calls.borrow().clone()
    }

    fn count(&self, op: StoreOp) -> usize {
        self.calls.borrow().iter().filter(|c| c.op() == op).count()
    }
}

// Identities start at 1 so a zero id never leaks out of a store.
fn next_id(counter: &Cell<u64>) -> u64 {
    let id = counter.get() + 1;
    counter.set(id);
    id
}

fn find_named<E, T>(
    rows: &BTreeMap<u64, T>,
    names: &[String],
    matching: NameMatch,
    name_of: impl Fn(&T) -> &str,
) -> Vec<Named<E>> {
    rows.iter()
        .filter(|(_, row)| names.iter().any(|n| matching.matches(name_of(row), n)))
        .map(|(id, row)| Named::new(Id::from_raw(*id), name_of(row)))
        .collect()
}

///
/// MemoryTagStore
///
/// Single-threaded in-memory tag store. Tag names are unique (exact match).
///

#[derive(Debug, Default)]
pub struct MemoryTagStore {
    rows: RefCell<BTreeMap<u64, Tag>>,
    last_id: Cell<u64>,
    harness: Harness,
}

impl MemoryTagStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag directly, bypassing the journal and faults.
    pub fn seed(&self, name: &str) -> Named<Tag> {
        let id = next_id(&self.last_id);
        let mut tag = Tag::new(name);
        tag.id = Some(Id::from_raw(id));
        self.rows.borrow_mut().insert(id, tag);

        Named::new(Id::from_raw(id), name)
    }

    #[must_use]
    pub fn get(&self, id: Id<Tag>) -> Option<Tag> {
        self.rows.borrow().get(&id.raw()).cloned()
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.rows.borrow().values().map(|t| t.name.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }

    /// Fail every call to `op` with `error`.
    pub fn fail_on(&self, op: StoreOp, error: StoreError) {
        self.harness.fail_after(op, 0, error);
    }

    /// Let `successes` calls to `op` through, then fail with `error`.
    pub fn fail_after(&self, op: StoreOp, successes: usize, error: StoreError) {
        self.harness.fail_after(op, successes, error);
    }

    pub fn clear_faults(&self) {
        self.harness.clear_faults();
    }

    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.harness.calls()
    }

    #[must_use]
    pub fn call_count(&self, op: StoreOp) -> usize {
        self.harness.count(op)
    }
}

impl NameFinder<Tag> for MemoryTagStore {
    fn find_by_names(
        &self,
        ctx: &Context,
        names: &[String],
        matching: NameMatch,
    ) -> Result<Vec<Named<Tag>>, StoreError> {
        self.harness.enter(
            ctx,
            StoreCall::FindTags {
                names: names.to_vec(),
            },
        )?;

        Ok(find_named(&self.rows.borrow(), names, matching, |t| {
            t.name.as_str()
        }))
    }
}

impl TagCreator for MemoryTagStore {
    fn create_tag(&self, ctx: &Context, mut tag: Tag) -> Result<Named<Tag>, StoreError> {
        self.harness.enter(
            ctx,
            StoreCall::CreateTag {
                name: tag.name.clone(),
            },
        )?;

        if tag.id.is_some() {
            return Err(StoreError::invariant(format!(
                "{} '{}' already has an identity",
                Tag::KIND,
                tag.name
            )));
        }
        if self.rows.borrow().values().any(|t| t.name == tag.name) {
            return Err(StoreError::conflict(format!(
                "{} name '{}' already exists",
                Tag::KIND,
                tag.name
            )));
        }

        let id = next_id(&self.last_id);
        tag.id = Some(Id::from_raw(id));
        let named = Named::new(Id::from_raw(id), tag.name.clone());
        self.rows.borrow_mut().insert(id, tag);

        Ok(named)
    }
}

///
/// PerformerRow
///
/// A stored performer together with its post-identity associations.
///

#[derive(Clone, Debug, PartialEq)]
pub struct PerformerRow {
    pub performer: Performer,
    pub tag_ids: Vec<Id<Tag>>,
    pub image: Option<Blob>,
    pub external_ids: Vec<ExternalId>,
}

///
/// MemoryPerformerStore
///
/// Single-threaded in-memory performer store. Name lookups return matches
/// in identity order.
///

#[derive(Debug, Default)]
pub struct MemoryPerformerStore {
    rows: RefCell<BTreeMap<u64, PerformerRow>>,
    last_id: Cell<u64>,
    harness: Harness,
}

impl MemoryPerformerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a performer directly, bypassing the journal and faults.
    pub fn seed(&self, performer: &Performer) -> Id<Performer> {
        let id = Id::from_raw(next_id(&self.last_id));
        self.rows.borrow_mut().insert(
            id.raw(),
            PerformerRow {
                performer: performer.with_id(id),
                tag_ids: Vec::new(),
                image: None,
                external_ids: Vec::new(),
            },
        );

        id
    }

    #[must_use]
    pub fn get(&self, id: Id<Performer>) -> Option<PerformerRow> {
        self.rows.borrow().get(&id.raw()).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }

    /// Fail every call to `op` with `error`.
    pub fn fail_on(&self, op: StoreOp, error: StoreError) {
        self.harness.fail_after(op, 0, error);
    }

    /// Let `successes` calls to `op` through, then fail with `error`.
    pub fn fail_after(&self, op: StoreOp, successes: usize, error: StoreError) {
        self.harness.fail_after(op, successes, error);
    }

    pub fn clear_faults(&self) {
        self.harness.clear_faults();
    }

    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.harness.calls()
    }

    #[must_use]
    pub fn call_count(&self, op: StoreOp) -> usize {
        self.harness.count(op)
    }

    fn with_row<R>(
        &self,
        id: Id<Performer>,
        f: impl FnOnce(&mut PerformerRow) -> R,
    ) -> Result<R, StoreError> {
        let mut rows = self.rows.borrow_mut();
        let row = rows
            .get_mut(&id.raw())
            .ok_or_else(|| StoreError::not_found(format!("{}:{id}", Performer::KIND)))?;

        Ok(f(row))
    }
}

impl NameFinder<Performer> for MemoryPerformerStore {
    fn find_by_names(
        &self,
        ctx: &Context,
        names: &[String],
        matching: NameMatch,
    ) -> Result<Vec<Named<Performer>>, StoreError> {
        self.harness.enter(
            ctx,
            StoreCall::FindPerformers {
                names: names.to_vec(),
            },
        )?;

        Ok(find_named(&self.rows.borrow(), names, matching, |row| {
            row.performer.name.as_str()
        }))
    }
}

impl PerformerWriter for MemoryPerformerStore {
    fn create_performer(
        &self,
        ctx: &Context,
        performer: &Performer,
    ) -> Result<Id<Performer>, StoreError> {
        self.harness.enter(
            ctx,
            StoreCall::CreatePerformer {
                name: performer.name.clone(),
            },
        )?;

        if performer.id.is_some() {
            return Err(StoreError::invariant(format!(
                "{} '{}' already has an identity",
                Performer::KIND,
                performer.name
            )));
        }

        Ok(self.seed(performer))
    }

    fn update_performer(&self, ctx: &Context, performer: &Performer) -> Result<(), StoreError> {
        self.harness
            .enter(ctx, StoreCall::UpdatePerformer { id: performer.id })?;

        let id = performer.id.ok_or_else(|| {
            StoreError::invariant(format!(
                "{} '{}' has no identity to update",
                Performer::KIND,
                performer.name
            ))
        })?;

        self.with_row(id, |row| row.performer = performer.clone())
    }

    fn update_tags(
        &self,
        ctx: &Context,
        id: Id<Performer>,
        tag_ids: &[Id<Tag>],
    ) -> Result<(), StoreError> {
        self.harness.enter(
            ctx,
            StoreCall::UpdateTags {
                id,
                tag_ids: tag_ids.to_vec(),
            },
        )?;

        self.with_row(id, |row| row.tag_ids = tag_ids.to_vec())
    }

    fn update_image(
        &self,
        ctx: &Context,
        id: Id<Performer>,
        image: &Blob,
    ) -> Result<(), StoreError> {
        self.harness
            .enter(ctx, StoreCall::UpdateImage { id, len: image.len() })?;

        self.with_row(id, |row| row.image = Some(image.clone()))
    }

    fn update_external_ids(
        &self,
        ctx: &Context,
        id: Id<Performer>,
        external_ids: &[ExternalId],
    ) -> Result<(), StoreError> {
        self.harness.enter(
            ctx,
            StoreCall::UpdateExternalIds {
                id,
                count: external_ids.len(),
            },
        )?;

        self.with_row(id, |row| row.external_ids = external_ids.to_vec())
    }
}

///
/// TESTS
///
