//! Observability: import counters and the sink abstraction.
//!
//! Pipeline code never touches the counters directly; it emits
//! [`ImportEvent`]s through `sink::record`, which either feeds the global
//! counters or a scoped override.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{ImportReport, StageFailures};
pub use sink::{ImportEvent, ImportSink, metrics_report, metrics_reset, with_import_sink};
