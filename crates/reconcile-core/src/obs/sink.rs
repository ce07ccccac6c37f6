//! Metrics sink boundary.
//!
//! The importer MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through ImportEvent and ImportSink.
use crate::{error::ImportStage, obs::metrics};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn ImportSink>>> = RefCell::new(None);
}

///
/// ImportEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImportEvent {
    Started {
        entity_kind: &'static str,
    },
    Created {
        entity_kind: &'static str,
    },
    Updated {
        entity_kind: &'static str,
    },
    Failed {
        entity_kind: &'static str,
        stage: ImportStage,
    },
    RefsResolved {
        ref_kind: &'static str,
        found: u64,
        created: u64,
        ignored: u64,
    },
}

///
/// ImportSink
///

pub trait ImportSink {
    fn record(&self, event: ImportEvent);
}

/// GlobalImportSink
/// Default thread-local sink that writes into the global counters.

pub(crate) struct GlobalImportSink;

impl ImportSink for GlobalImportSink {
    fn record(&self, event: ImportEvent) {
        metrics::with_state_mut(|m| match event {
            ImportEvent::Started { .. } => {
                m.imports_started = m.imports_started.saturating_add(1);
            }
            ImportEvent::Created { .. } => {
                m.performers_created = m.performers_created.saturating_add(1);
            }
            ImportEvent::Updated { .. } => {
                m.performers_updated = m.performers_updated.saturating_add(1);
            }
            ImportEvent::Failed { stage, .. } => m.failures.bump(stage),
            ImportEvent::RefsResolved {
                found,
                created,
                ignored,
                ..
            } => {
                m.refs_found = m.refs_found.saturating_add(found);
                m.refs_created = m.refs_created.saturating_add(created);
                m.refs_ignored = m.refs_ignored.saturating_add(ignored);
            }
        });
    }
}

pub(crate) fn record(event: ImportEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match sink {
        Some(sink) => sink.record(event),
        None => GlobalImportSink.record(event),
    }
}

/// Snapshot the counters fed by the global sink.
#[must_use]
pub fn metrics_report() -> metrics::ImportReport {
    metrics::report()
}

/// Reset the counters fed by the global sink.
pub fn metrics_reset() {
    metrics::reset();
}

/// Run a closure with a temporary sink override on this thread.
pub fn with_import_sink<T>(sink: Rc<dyn ImportSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn ImportSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///
