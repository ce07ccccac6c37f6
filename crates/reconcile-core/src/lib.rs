//! Core import pipeline for Reconcile: interchange records, the field mapper,
//! reference resolution, identity matching and the staged importer.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod context;
pub mod error;
pub mod image;
pub mod importer;
pub mod mapper;
pub mod matcher;
pub mod model;
pub mod obs;
pub mod policy;
pub mod resolve;
pub mod store;
pub mod types;

///
/// Prelude
///
/// Prelude contains the vocabulary a batch driver needs to run one import.
/// Store implementations and observability helpers stay one level down.
///

pub mod prelude {
    pub use crate::{
        context::{CancelToken, Context},
        error::{ImportError, StoreError},
        importer::{ImportAction, ImportOutcome, PerformerImporter},
        model::{ExternalId, Performer, PerformerRecord, Tag},
        policy::{MissingRefPolicy, NameMatch},
        types::Id,
    };
}
