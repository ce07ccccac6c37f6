use crate::error::ImportStage;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

///
/// ImportReport
/// Ephemeral, in-memory counters for imports run on this thread.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ImportReport {
    pub imports_started: u64,
    pub performers_created: u64,
    pub performers_updated: u64,
    pub failures: StageFailures,

    // Reference resolution
    pub refs_found: u64,
    pub refs_created: u64,
    pub refs_ignored: u64,
}

///
/// StageFailures
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StageFailures {
    pub pre_import: u64,
    pub matching: u64,
    pub create: u64,
    pub update: u64,
    pub post_import: u64,
}

impl StageFailures {
    pub(crate) const fn bump(&mut self, stage: ImportStage) {
        let slot = match stage {
            ImportStage::PreImport => &mut self.pre_import,
            ImportStage::Match => &mut self.matching,
            ImportStage::Create => &mut self.create,
            ImportStage::Update => &mut self.update,
            ImportStage::PostImport => &mut self.post_import,
        };
        *slot = slot.saturating_add(1);
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.pre_import
            .saturating_add(self.matching)
            .saturating_add(self.create)
            .saturating_add(self.update)
            .saturating_add(self.post_import)
    }
}

thread_local! {
    static STATE: RefCell<ImportReport> = RefCell::new(ImportReport::default());
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut ImportReport) -> R) -> R {
    STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Snapshot the current counters.
pub(crate) fn report() -> ImportReport {
    STATE.with(|m| m.borrow().clone())
}

/// Reset all counters (useful in tests).
pub(crate) fn reset() {
    with_state_mut(|m| *m = ImportReport::default());
}
