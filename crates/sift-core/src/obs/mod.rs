//! Observability: filter telemetry (metrics) and sink abstractions.
//!
//! Parsing, compilation and evaluation never touch `metrics` directly;
//! every counter update flows through `sink::record`.

pub(crate) mod metrics;
pub(crate) mod sink;

#[cfg(test)]
mod tests;

// re-exports
pub use metrics::{EventReport, EventTotals, RecordCounters};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
