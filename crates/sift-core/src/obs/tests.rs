use crate::obs::{
    MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, sink::record,
    with_metrics_sink,
};
use std::{cell::RefCell, rc::Rc};

#[derive(Default)]
struct CaptureSink {
    events: RefCell<Vec<MetricsEvent>>,
}

impl MetricsSink for CaptureSink {
    fn record(&self, event: MetricsEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[test]
fn global_sink_accumulates_per_record_type() {
    metrics_reset_all();

    record(MetricsEvent::FilterParsed {
        record_type: "User",
        nodes: 3,
    });
    record(MetricsEvent::FilterCompiled {
        record_type: "User",
    });
    record(MetricsEvent::RecordsEvaluated {
        record_type: "User",
        scanned: 3,
        matched: 1,
    });
    record(MetricsEvent::FilterRejected {
        record_type: "Address",
    });

    let report = metrics_report();
    assert_eq!(report.totals.filters_parsed, 1);
    assert_eq!(report.totals.nodes_parsed, 3);
    assert_eq!(report.totals.filters_rejected, 1);

    let user = report.record("User").expect("user counters should exist");
    assert_eq!(user.filters_compiled, 1);
    assert_eq!(user.records_scanned, 3);
    assert_eq!(user.records_matched, 1);

    let address = report.record("Address").expect("address counters should exist");
    assert_eq!(address.filters_rejected, 1);
    assert_eq!(address.filters_parsed, 0);
}

#[test]
fn reset_clears_all_counters() {
    record(MetricsEvent::CompileFailed {
        record_type: "User",
    });
    metrics_reset_all();

    let report = metrics_report();
    assert_eq!(report.totals.compile_failures, 0);
    assert!(report.records.is_empty());
}

#[test]
fn scoped_sink_captures_and_restores() {
    metrics_reset_all();
    let capture = Rc::new(CaptureSink::default());

    with_metrics_sink(capture.clone(), || {
        record(MetricsEvent::FilterCompiled {
            record_type: "User",
        });
    });
    record(MetricsEvent::FilterCompiled {
        record_type: "User",
    });

    assert_eq!(
        capture.events.borrow().as_slice(),
        &[MetricsEvent::FilterCompiled {
            record_type: "User"
        }]
    );
    assert_eq!(metrics_report().totals.filters_compiled, 1);
}

#[test]
fn report_serializes_to_json() {
    metrics_reset_all();
    record(MetricsEvent::FilterParsed {
        record_type: "User",
        nodes: 1,
    });

    let json = serde_json::to_value(metrics_report()).expect("report should serialize");
    assert_eq!(json["totals"]["filters_parsed"], 1);
    assert_eq!(json["records"]["User"]["filters_parsed"], 1);
}
