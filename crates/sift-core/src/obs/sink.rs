//! Metrics sink boundary.
//!
//! Filter logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    FilterParsed {
        record_type: &'static str,
        nodes: u64,
    },
    FilterRejected {
        record_type: &'static str,
    },
    FilterCompiled {
        record_type: &'static str,
    },
    CompileFailed {
        record_type: &'static str,
    },
    RecordsEvaluated {
        record_type: &'static str,
        scanned: u64,
        matched: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::FilterParsed { record_type, nodes } => {
                metrics::with_state_mut(|m| {
                    m.totals.filters_parsed = m.totals.filters_parsed.saturating_add(1);
                    m.totals.nodes_parsed = m.totals.nodes_parsed.saturating_add(nodes);
                    let entry = m.records.entry(record_type.to_string()).or_default();
                    entry.filters_parsed = entry.filters_parsed.saturating_add(1);
                });
            }

            MetricsEvent::FilterRejected { record_type } => {
                metrics::with_state_mut(|m| {
                    m.totals.filters_rejected = m.totals.filters_rejected.saturating_add(1);
                    let entry = m.records.entry(record_type.to_string()).or_default();
                    entry.filters_rejected = entry.filters_rejected.saturating_add(1);
                });
            }

            MetricsEvent::FilterCompiled { record_type } => {
                metrics::with_state_mut(|m| {
                    m.totals.filters_compiled = m.totals.filters_compiled.saturating_add(1);
                    let entry = m.records.entry(record_type.to_string()).or_default();
                    entry.filters_compiled = entry.filters_compiled.saturating_add(1);
                });
            }

            MetricsEvent::CompileFailed { record_type } => {
                metrics::with_state_mut(|m| {
                    m.totals.compile_failures = m.totals.compile_failures.saturating_add(1);
                    let entry = m.records.entry(record_type.to_string()).or_default();
                    entry.compile_failures = entry.compile_failures.saturating_add(1);
                });
            }

            MetricsEvent::RecordsEvaluated {
                record_type,
                scanned,
                matched,
            } => {
                metrics::with_state_mut(|m| {
                    m.totals.records_scanned = m.totals.records_scanned.saturating_add(scanned);
                    m.totals.records_matched = m.totals.records_matched.saturating_add(matched);
                    let entry = m.records.entry(record_type.to_string()).or_default();
                    entry.records_scanned = entry.records_scanned.saturating_add(scanned);
                    entry.records_matched = entry.records_matched.saturating_add(matched);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let installed = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match installed {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state of this thread.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state of this thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override on this thread.
/// The previous sink is restored on every exit, including unwind.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

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
