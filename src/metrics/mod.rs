pub mod collector;
pub mod outcome;
pub mod percentiles;
pub mod reporter;
pub mod stream;

pub use collector::{
    CollectorSnapshot, MethodMetricsSnapshot, MetricsCollector, DEFAULT_MAX_LATENCY_SAMPLES,
    UNKNOWN_METHOD,
};
pub use outcome::{Classify, Outcome};
pub use reporter::{ReporterHandle, SnapshotReporter, DEFAULT_REPORT_INTERVAL};
