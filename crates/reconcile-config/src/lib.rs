//! TOML configuration for Reconcile import runs.
//!
//! ```toml
//! missing_refs = "create_missing"
//! name_match = "exact"
//! timeout_ms = 30000
//! ```

use reconcile_core::{
    context::Context,
    importer::PerformerImporter,
    model::PerformerRecord,
    policy::{MissingRefPolicy, NameMatch},
    store::{PerformerWriter, TagCreator},
};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// ImportConfig
///
/// Settings shared by every import in a run. Missing keys take their
/// defaults; unknown keys are rejected.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    pub missing_refs: MissingRefPolicy,
    pub name_match: NameMatch,

    /// Per-import deadline. Absent means no deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ImportConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "timeout_ms must be positive; omit it for no deadline".to_string(),
            ));
        }

        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// A fresh context for one import, with the configured deadline.
    #[must_use]
    pub fn context(&self) -> Context {
        let ctx = Context::background();
        match self.timeout() {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        }
    }

    /// An importer for `input` using this run's policy and case mode.
    pub fn importer<'a, P, T>(
        &self,
        performers: &'a P,
        tags: &'a T,
        input: PerformerRecord,
    ) -> PerformerImporter<'a, P, T>
    where
        P: PerformerWriter + ?Sized,
        T: TagCreator + ?Sized,
    {
        PerformerImporter::new(performers, tags, input, self.missing_refs)
            .with_name_match(self.name_match)
    }
}

///
/// TESTS
///
