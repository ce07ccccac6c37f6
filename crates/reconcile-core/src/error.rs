use crate::{model::Performer, types::Id};
use std::fmt;
use thiserror::Error as ThisError;

///
/// StoreError
///
/// Failure reported by a store collaborator.
/// The pipeline never retries; it wraps these with stage context and
/// surfaces them unchanged.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{class}: {message}")]
pub struct StoreError {
    pub class: ErrorClass,
    pub message: String,
}

impl StoreError {
    pub fn new(class: ErrorClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
        }
    }

    pub fn not_found(key: impl fmt::Display) -> Self {
        Self::new(ErrorClass::NotFound, format!("key not found: {key}"))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Conflict, message)
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, message)
    }

    pub(crate) fn canceled() -> Self {
        Self::new(ErrorClass::Canceled, "operation canceled by caller")
    }

    pub(crate) fn deadline_exceeded() -> Self {
        Self::new(ErrorClass::DeadlineExceeded, "deadline exceeded")
    }

    /// Whether the failure came from the caller's context rather than the store.
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(
            self.class,
            ErrorClass::Canceled | ErrorClass::DeadlineExceeded
        )
    }
}

///
/// ErrorClass
/// Error taxonomy for store failures.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    Conflict,
    Canceled,
    DeadlineExceeded,
    InvariantViolation,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Canceled => "canceled",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::InvariantViolation => "invariant_violation",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ImageDecodeError
///

#[derive(Debug, ThisError)]
pub enum ImageDecodeError {
    #[error("malformed data uri: {0}")]
    MalformedDataUri(String),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

///
/// MappingError
/// Interchange values the field mapper refuses to carry over.
///

#[derive(Debug, ThisError)]
pub enum MappingError {
    #[error("invalid image: {0}")]
    Image(#[from] ImageDecodeError),
}

///
/// ResolveError
///

#[derive(Debug, ThisError)]
pub enum ResolveError {
    #[error("failed to look up tags: {0}")]
    Lookup(#[source] StoreError),

    #[error("tags [{}] not found", .names.join(", "))]
    Missing { names: Vec<String> },

    /// Tags created before `name` failed remain in the store.
    #[error("error creating tags: {name}: {source}")]
    Create {
        name: String,
        #[source]
        source: StoreError,
    },
}

///
/// PostImportStep
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PostImportStep {
    Tags,
    Image,
    ExternalIds,
}

impl fmt::Display for PostImportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Tags => "failed to associate tags",
            Self::Image => "error setting performer image",
            Self::ExternalIds => "error setting stash ids",
        };
        write!(f, "{label}")
    }
}

///
/// ImportStage
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImportStage {
    PreImport,
    Match,
    Create,
    Update,
    PostImport,
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::PreImport => "pre_import",
            Self::Match => "match",
            Self::Create => "create",
            Self::Update => "update",
            Self::PostImport => "post_import",
        };
        write!(f, "{label}")
    }
}

///
/// ImportError
///
/// Every failure of a single-entity import.
/// Errors before `Create`/`Update` leave the store without a performer write;
/// `PostImport` means the performer itself is already durable.
///

#[derive(Debug, ThisError)]
pub enum ImportError {
    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to look up existing performer: {0}")]
    Lookup(#[source] StoreError),

    #[error("error creating performer: {0}")]
    Create(#[source] StoreError),

    #[error("error updating existing performer: {0}")]
    Update(#[source] StoreError),

    #[error("{step} (performer {id}): {source}")]
    PostImport {
        step: PostImportStep,
        id: Id<Performer>,
        #[source]
        source: StoreError,
    },
}

impl ImportError {
    #[must_use]
    pub const fn stage(&self) -> ImportStage {
        match self {
            Self::Mapping(_) | Self::Resolve(_) => ImportStage::PreImport,
            Self::Lookup(_) => ImportStage::Match,
            Self::Create(_) => ImportStage::Create,
            Self::Update(_) => ImportStage::Update,
            Self::PostImport { .. } => ImportStage::PostImport,
        }
    }

    /// Whether the performer row was written before the failure.
    #[must_use]
    pub const fn entity_persisted(&self) -> bool {
        matches!(self, Self::PostImport { .. })
    }

    /// The underlying store failure, if the error came from the store.
    #[must_use]
    pub const fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::Resolve(ResolveError::Lookup(err) | ResolveError::Create { source: err, .. })
            | Self::Lookup(err)
            | Self::Create(err)
            | Self::Update(err)
            | Self::PostImport { source: err, .. } => Some(err),
            Self::Mapping(_) | Self::Resolve(ResolveError::Missing { .. }) => None,
        }
    }
}

///
/// TESTS
///
