//! Single-performer import.
//!
//! An import runs strictly in order:
//!
//! 1. `pre_import`: map fields, resolve tags, decode the image. Nothing is
//!    written to the performer store before this succeeds.
//! 2. `find_existing_id`: natural-key lookup; the only branch point.
//! 3. `create` or `update`: persist the performer and obtain its identity.
//! 4. `post_import`: tags, image and external ids, keyed by that identity.
//!
//! The first failure stops the import. Nothing is rolled back, so a failed
//! post-import step leaves the performer itself persisted.

use crate::{
    context::Context,
    error::{ImportError, MappingError, PostImportStep, StoreError},
    image::decode_image,
    mapper::map_performer,
    matcher,
    model::{Entity, Named, Performer, PerformerRecord, Tag},
    obs::sink::{self, ImportEvent},
    policy::{MissingRefPolicy, NameMatch},
    resolve::resolve_tags,
    store::{PerformerWriter, TagCreator},
    types::{Blob, Id},
};
use std::fmt;
use tracing::{debug, info, instrument, warn};

///
/// ImportAction
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImportAction {
    Created,
    Updated,
}

impl fmt::Display for ImportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Created => "created",
            Self::Updated => "updated",
        };
        write!(f, "{label}")
    }
}

///
/// ImportOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ImportOutcome {
    pub id: Id<Performer>,
    pub action: ImportAction,
}

///
/// PreImported
///
/// Everything derived from the record before the store is asked about the
/// performer: the candidate value, its resolved tags and image bytes.
///

#[derive(Clone, Debug)]
pub struct PreImported {
    performer: Performer,
    tags: Vec<Named<Tag>>,
    image: Option<Blob>,
}

impl PreImported {
    #[must_use]
    pub const fn performer(&self) -> &Performer {
        &self.performer
    }

    #[must_use]
    pub fn tags(&self) -> &[Named<Tag>] {
        &self.tags
    }

    #[must_use]
    pub const fn image(&self) -> Option<&Blob> {
        self.image.as_ref()
    }

    fn tag_ids(&self) -> Vec<Id<Tag>> {
        self.tags.iter().map(|t| t.id).collect()
    }
}

///
/// PerformerImporter
///
/// Imports one interchange record. The policy and case mode are fixed at
/// construction for the whole import.
///

pub struct PerformerImporter<'a, P: ?Sized, T: ?Sized> {
    performers: &'a P,
    tags: &'a T,
    input: PerformerRecord,
    missing_refs: MissingRefPolicy,
    name_match: NameMatch,
}

impl<'a, P, T> PerformerImporter<'a, P, T>
where
    P: PerformerWriter + ?Sized,
    T: TagCreator + ?Sized,
{
    #[must_use]
    pub const fn new(
        performers: &'a P,
        tags: &'a T,
        input: PerformerRecord,
        missing_refs: MissingRefPolicy,
    ) -> Self {
        Self {
            performers,
            tags,
            input,
            missing_refs,
            name_match: NameMatch::Exact,
        }
    }

    /// Case mode for the existing-performer lookup. Tag lookups stay exact.
    #[must_use]
    pub fn with_name_match(mut self, name_match: NameMatch) -> Self {
        self.name_match = name_match;
        self
    }

    /// Natural key of the record being imported.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.input.name
    }

    #[must_use]
    pub const fn input(&self) -> &PerformerRecord {
        &self.input
    }

    #[must_use]
    pub const fn missing_refs(&self) -> MissingRefPolicy {
        self.missing_refs
    }

    // ======================================================================
    // Stages
    // ======================================================================

    /// Build the candidate performer, resolve its tags and decode its image.
    pub fn pre_import(&self, ctx: &Context) -> Result<PreImported, ImportError> {
        let performer = map_performer(&self.input);

        let tags = if self.input.tags.is_empty() {
            Vec::new()
        } else {
            resolve_tags(ctx, self.tags, &self.input.tags, self.missing_refs)?
        };

        let image = if self.input.image.is_empty() {
            None
        } else {
            Some(decode_image(&self.input.image).map_err(MappingError::from)?)
        };

        debug!(
            tags = tags.len(),
            image = image.is_some(),
            "pre-import complete"
        );

        Ok(PreImported {
            performer,
            tags,
            image,
        })
    }

    /// Identity of an existing performer with the same name, if any.
    pub fn find_existing_id(&self, ctx: &Context) -> Result<Option<Id<Performer>>, ImportError> {
        matcher::find_existing_id(ctx, self.performers, self.name(), self.name_match)
            .map_err(ImportError::Lookup)
    }

    /// Insert the candidate; the store assigns the identity.
    pub fn create(&self, ctx: &Context, pre: &PreImported) -> Result<Id<Performer>, ImportError> {
        let id = self
            .performers
            .create_performer(ctx, &pre.performer)
            .map_err(ImportError::Create)?;
        info!(%id, "performer created");

        Ok(id)
    }

    /// Overwrite the existing performer with a copy of the candidate.
    pub fn update(
        &self,
        ctx: &Context,
        pre: &PreImported,
        id: Id<Performer>,
    ) -> Result<(), ImportError> {
        let performer = pre.performer.with_id(id);
        self.performers
            .update_performer(ctx, &performer)
            .map_err(ImportError::Update)?;
        info!(%id, "performer updated");

        Ok(())
    }

    /// Write the associations that need the performer's identity.
    pub fn post_import(
        &self,
        ctx: &Context,
        pre: &PreImported,
        id: Id<Performer>,
    ) -> Result<(), ImportError> {
        let wrap = |step: PostImportStep| {
            move |source: StoreError| ImportError::PostImport { step, id, source }
        };

        if !pre.tags.is_empty() {
            self.performers
                .update_tags(ctx, id, &pre.tag_ids())
                .map_err(wrap(PostImportStep::Tags))?;
        }

        if let Some(image) = pre.image.as_ref().filter(|image| !image.is_empty()) {
            self.performers
                .update_image(ctx, id, image)
                .map_err(wrap(PostImportStep::Image))?;
        }

        if !self.input.stash_ids.is_empty() {
            self.performers
                .update_external_ids(ctx, id, &self.input.stash_ids)
                .map_err(wrap(PostImportStep::ExternalIds))?;
        }

        Ok(())
    }

    // ======================================================================
    // Full import
    // ======================================================================

    /// Run every stage for this record.
    #[instrument(skip_all, fields(kind = Performer::KIND, performer = %self.name()))]
    pub fn import(&self, ctx: &Context) -> Result<ImportOutcome, ImportError> {
        sink::record(ImportEvent::Started {
            entity_kind: Performer::KIND,
        });

        let result = self.run(ctx);

        match &result {
            Ok(outcome) => {
                let event = match outcome.action {
                    ImportAction::Created => ImportEvent::Created {
                        entity_kind: Performer::KIND,
                    },
                    ImportAction::Updated => ImportEvent::Updated {
                        entity_kind: Performer::KIND,
                    },
                };
                sink::record(event);
            }
            Err(err) => {
                sink::record(ImportEvent::Failed {
                    entity_kind: Performer::KIND,
                    stage: err.stage(),
                });
                warn!(
                    stage = %err.stage(),
                    persisted = err.entity_persisted(),
                    error = %err,
                    "import failed"
                );
            }
        }

        result
    }

    fn run(&self, ctx: &Context) -> Result<ImportOutcome, ImportError> {
        let pre = self.pre_import(ctx)?;

        let outcome = match self.find_existing_id(ctx)? {
            Some(id) => {
                self.update(ctx, &pre, id)?;
                ImportOutcome {
                    id,
                    action: ImportAction::Updated,
                }
            }
            None => ImportOutcome {
                id: self.create(ctx, &pre)?,
                action: ImportAction::Created,
            },
        };

        self.post_import(ctx, &pre, outcome.id)?;

        Ok(outcome)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{ErrorClass, ImportStage, ResolveError},
        model::ExternalId,
        store::{MemoryPerformerStore, MemoryTagStore, StoreOp},
    };

    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn jane() -> PerformerRecord {
        PerformerRecord {
            tags: vec!["blonde".to_string()],
            image: PIXEL.to_string(),
            stash_ids: vec![ExternalId::new("tpdb", "jane-1")],
            ..PerformerRecord::named("Jane Doe")
        }
    }

    #[test]
    fn pre_import_skips_resolution_without_tags() {
        let performers = MemoryPerformerStore::new();
        let tags = MemoryTagStore::new();
        let importer = PerformerImporter::new(
            &performers,
            &tags,
            PerformerRecord::named("Jane Doe"),
            MissingRefPolicy::Fail,
        );

        let pre = importer.pre_import(&Context::background()).unwrap();

        assert!(pre.tags().is_empty());
        assert!(pre.image().is_none());
        assert!(tags.calls().is_empty());
        assert!(performers.calls().is_empty());
    }

    #[test]
    fn bad_image_aborts_before_any_performer_call() {
        let performers = MemoryPerformerStore::new();
        let tags = MemoryTagStore::new();
        let record = PerformerRecord {
            image: "data:image/png;base64,@@@".to_string(),
            ..PerformerRecord::named("Jane Doe")
        };
        let importer = PerformerImporter::new(&performers, &tags, record, MissingRefPolicy::Fail);

        let err = importer.import(&Context::background()).unwrap_err();

        assert!(matches!(err, ImportError::Mapping(_)));
        assert!(err.to_string().starts_with("invalid image"));
        assert!(performers.calls().is_empty());
    }

    #[test]
    fn update_writes_copy_with_existing_identity() {
        let performers = MemoryPerformerStore::new();
        let tags = MemoryTagStore::new();
        let existing = performers.seed(&map_performer(&PerformerRecord::named("Jane Doe")));
        let record = PerformerRecord {
            country: "NZ".to_string(),
            ..PerformerRecord::named("Jane Doe")
        };
        let importer = PerformerImporter::new(&performers, &tags, record, MissingRefPolicy::Fail);
        let ctx = Context::background();

        let pre = importer.pre_import(&ctx).unwrap();
        importer.update(&ctx, &pre, existing).unwrap();

        assert_eq!(pre.performer().id, None);
        let row = performers.get(existing).unwrap();
        assert_eq!(row.performer.id, Some(existing));
        assert_eq!(row.performer.country, "NZ");
    }

    #[test]
    fn post_import_writes_all_associations() {
        let performers = MemoryPerformerStore::new();
        let tags = MemoryTagStore::new();
        let importer =
            PerformerImporter::new(&performers, &tags, jane(), MissingRefPolicy::CreateMissing);

        let outcome = importer.import(&Context::background()).unwrap();

        let row = performers.get(outcome.id).unwrap();
        assert_eq!(row.tag_ids.len(), 1);
        assert_eq!(row.image.map(|i| i.len()), Some(8));
        assert_eq!(row.external_ids, vec![ExternalId::new("tpdb", "jane-1")]);
    }

    #[test]
    fn post_import_failure_names_step_and_stops() {
        let performers = MemoryPerformerStore::new();
        let tags = MemoryTagStore::new();
        performers.fail_on(StoreOp::UpdateImage, StoreError::internal("blob store down"));
        let importer =
            PerformerImporter::new(&performers, &tags, jane(), MissingRefPolicy::CreateMissing);

        let err = importer.import(&Context::background()).unwrap_err();

        match &err {
            ImportError::PostImport { step, .. } => assert_eq!(*step, PostImportStep::Image),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.entity_persisted());
        assert_eq!(performers.len(), 1);
        assert_eq!(performers.call_count(StoreOp::UpdateTags), 1);
        assert_eq!(performers.call_count(StoreOp::UpdateExternalIds), 0);
    }

    #[test]
    fn create_failure_is_wrapped() {
        let performers = MemoryPerformerStore::new();
        let tags = MemoryTagStore::new();
        performers.fail_on(StoreOp::CreatePerformer, StoreError::conflict("checksum"));
        let importer = PerformerImporter::new(
            &performers,
            &tags,
            PerformerRecord::named("Jane Doe"),
            MissingRefPolicy::Fail,
        );

        let err = importer.import(&Context::background()).unwrap_err();

        assert_eq!(err.stage(), ImportStage::Create);
        assert_eq!(
            err.store_error().map(|e| e.class),
            Some(ErrorClass::Conflict)
        );
        assert!(err.to_string().starts_with("error creating performer"));
        assert!(!err.entity_persisted());
    }

    #[test]
    fn update_failure_leaves_existing_row() {
        let performers = MemoryPerformerStore::new();
        let tags = MemoryTagStore::new();
        let existing = performers.seed(&map_performer(&PerformerRecord::named("Jane Doe")));
        performers.fail_on(StoreOp::UpdatePerformer, StoreError::internal("locked"));
        let record = PerformerRecord {
            country: "NZ".to_string(),
            ..PerformerRecord::named("Jane Doe")
        };
        let importer = PerformerImporter::new(&performers, &tags, record, MissingRefPolicy::Fail);

        let err = importer.import(&Context::background()).unwrap_err();

        assert_eq!(err.stage(), ImportStage::Update);
        assert!(performers.get(existing).unwrap().performer.country.is_empty());
    }

    #[test]
    fn lookup_failure_stops_before_create() {
        let performers = MemoryPerformerStore::new();
        let tags = MemoryTagStore::new();
        performers.fail_on(StoreOp::FindPerformers, StoreError::internal("offline"));
        let importer = PerformerImporter::new(
            &performers,
            &tags,
            PerformerRecord::named("Jane Doe"),
            MissingRefPolicy::Fail,
        );

        let err = importer.import(&Context::background()).unwrap_err();

        assert_eq!(err.stage(), ImportStage::Match);
        assert_eq!(performers.call_count(StoreOp::CreatePerformer), 0);
    }

    #[test]
    fn canceled_context_surfaces_store_error() {
        let performers = MemoryPerformerStore::new();
        let tags = MemoryTagStore::new();
        let importer = PerformerImporter::new(&performers, &tags, jane(), MissingRefPolicy::Ignore);
        let ctx = Context::background();
        ctx.cancel_token().cancel();

        let err = importer.import(&ctx).unwrap_err();

        assert!(matches!(err, ImportError::Resolve(ResolveError::Lookup(_))));
        assert!(err.store_error().is_some_and(StoreError::is_interrupted));
        assert!(performers.is_empty());
    }
}
