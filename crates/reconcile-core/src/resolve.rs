//! Reference resolution under a missing-reference policy.

use crate::{
    context::Context,
    error::ResolveError,
    model::{Entity, Named, Tag},
    obs::sink::{self, ImportEvent},
    policy::{MissingRefPolicy, NameMatch},
    store::TagCreator,
};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Resolve tag names against the store.
///
/// Looks every name up in one exact-match batch, then applies `policy` to
/// the names the store does not know. The result holds the found tags
/// followed by any created ones. An empty `names` list makes no store call.
///
/// Under `CreateMissing` tags are created one at a time in input order; a
/// failure stops the loop and the tags created before it stay in the store.
pub fn resolve_tags<S>(
    ctx: &Context,
    store: &S,
    names: &[String],
    policy: MissingRefPolicy,
) -> Result<Vec<Named<Tag>>, ResolveError>
where
    S: TagCreator + ?Sized,
{
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let mut tags = store
        .find_by_names(ctx, names, NameMatch::Exact)
        .map_err(ResolveError::Lookup)?;
    let found = tags.len();

    let missing = missing_names(names, &tags);
    debug!(
        kind = Tag::KIND,
        requested = names.len(),
        found,
        missing = missing.len(),
        %policy,
        "resolving references"
    );

    let mut created = 0usize;
    let mut ignored = 0usize;

    if !missing.is_empty() {
        match policy {
            MissingRefPolicy::Fail => {
                return Err(ResolveError::Missing { names: missing });
            }
            MissingRefPolicy::CreateMissing => {
                for name in missing {
                    let tag = store
                        .create_tag(ctx, Tag::new(name.as_str()))
                        .map_err(|source| ResolveError::Create {
                            name: name.clone(),
                            source,
                        })?;
                    info!(kind = Tag::KIND, id = %tag.id, name = %tag.name, "created missing reference");

                    tags.push(tag);
                    created += 1;
                }
            }
            MissingRefPolicy::Ignore => {
                warn!(
                    kind = Tag::KIND,
                    names = %missing.join(", "),
                    "ignoring missing references"
                );
                ignored = missing.len();
            }
        }
    }

    sink::record(ImportEvent::RefsResolved {
        ref_kind: Tag::KIND,
        found: found as u64,
        created: created as u64,
        ignored: ignored as u64,
    });

    Ok(tags)
}

// Input names absent from `found`, first occurrence order, each name once.
fn missing_names<E>(names: &[String], found: &[Named<E>]) -> Vec<String> {
    let present: BTreeSet<&str> = found.iter().map(|t| t.name.as_str()).collect();
    let mut seen = BTreeSet::new();

    names
        .iter()
        .filter(|name| !present.contains(name.as_str()))
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{ErrorClass, StoreError},
        store::{MemoryTagStore, StoreOp},
    };

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn store_with(existing: &[&str]) -> MemoryTagStore {
        let store = MemoryTagStore::new();
        for name in existing {
            store.seed(name);
        }
        store
    }

    #[test]
    fn empty_input_makes_no_store_calls() {
        let store = store_with(&["a"]);

        for policy in [
            MissingRefPolicy::Fail,
            MissingRefPolicy::CreateMissing,
            MissingRefPolicy::Ignore,
        ] {
            let tags = resolve_tags(&Context::background(), &store, &[], policy).unwrap();
            assert!(tags.is_empty());
        }

        assert!(store.calls().is_empty());
    }

    #[test]
    fn all_present_needs_one_lookup() {
        let store = store_with(&["a", "b"]);

        let tags = resolve_tags(
            &Context::background(),
            &store,
            &names(&["a", "b"]),
            MissingRefPolicy::Fail,
        )
        .unwrap();

        assert_eq!(tags.len(), 2);
        assert_eq!(store.calls().len(), 1);
    }

    #[test]
    fn fail_policy_names_every_missing_tag_and_creates_nothing() {
        let store = store_with(&["a"]);

        let err = resolve_tags(
            &Context::background(),
            &store,
            &names(&["x", "a", "y"]),
            MissingRefPolicy::Fail,
        )
        .unwrap_err();

        match err {
            ResolveError::Missing { names } => assert_eq!(names, vec!["x", "y"]),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.call_count(StoreOp::CreateTag), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn create_policy_returns_one_tag_per_name() {
        let store = store_with(&["a"]);
        let input = names(&["a", "b", "c"]);

        let tags = resolve_tags(
            &Context::background(),
            &store,
            &input,
            MissingRefPolicy::CreateMissing,
        )
        .unwrap();

        let mut got: Vec<_> = tags.iter().map(|t| t.name.clone()).collect();
        got.sort();
        assert_eq!(got, input);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn create_policy_creates_in_input_order() {
        let store = MemoryTagStore::new();

        resolve_tags(
            &Context::background(),
            &store,
            &names(&["zeta", "alpha", "mid"]),
            MissingRefPolicy::CreateMissing,
        )
        .unwrap();

        assert_eq!(store.names(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn duplicate_missing_names_are_created_once() {
        let store = MemoryTagStore::new();

        let tags = resolve_tags(
            &Context::background(),
            &store,
            &names(&["a", "a"]),
            MissingRefPolicy::CreateMissing,
        )
        .unwrap();

        assert_eq!(tags.len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let store = store_with(&["Blonde"]);

        let tags = resolve_tags(
            &Context::background(),
            &store,
            &names(&["blonde"]),
            MissingRefPolicy::CreateMissing,
        )
        .unwrap();

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "blonde");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn create_failure_keeps_earlier_tags() {
        let store = MemoryTagStore::new();
        store.fail_after(StoreOp::CreateTag, 1, StoreError::internal("disk full"));

        let err = resolve_tags(
            &Context::background(),
            &store,
            &names(&["a", "b", "c"]),
            MissingRefPolicy::CreateMissing,
        )
        .unwrap_err();

        match err {
            ResolveError::Create { name, source } => {
                assert_eq!(name, "b");
                assert_eq!(source.class, ErrorClass::Internal);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.names(), vec!["a"]);
        assert_eq!(store.call_count(StoreOp::CreateTag), 2);
    }

    #[test]
    fn ignore_policy_returns_found_subset() {
        let store = store_with(&["a", "c"]);
        let input = names(&["a", "b", "c", "d"]);

        let tags = resolve_tags(
            &Context::background(),
            &store,
            &input,
            MissingRefPolicy::Ignore,
        )
        .unwrap();

        assert_eq!(tags.len(), input.len() - 2);
        assert_eq!(store.call_count(StoreOp::CreateTag), 0);
    }

    #[test]
    fn lookup_failure_is_surfaced() {
        let store = store_with(&["a"]);
        store.fail_on(StoreOp::FindTags, StoreError::internal("offline"));

        let err = resolve_tags(
            &Context::background(),
            &store,
            &names(&["a"]),
            MissingRefPolicy::Ignore,
        )
        .unwrap_err();

        assert!(matches!(err, ResolveError::Lookup(_)));
    }

    #[test]
    fn second_pass_finds_created_tags() {
        let store = MemoryTagStore::new();
        let input = names(&["a", "b"]);
        let ctx = Context::background();

        resolve_tags(&ctx, &store, &input, MissingRefPolicy::CreateMissing).unwrap();
        let again = resolve_tags(&ctx, &store, &input, MissingRefPolicy::CreateMissing).unwrap();

        assert_eq!(again.len(), 2);
        assert_eq!(store.call_count(StoreOp::CreateTag), 2);
    }
}
