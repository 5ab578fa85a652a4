use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for filter requests on this thread.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct EventState {
    pub(crate) totals: EventTotals,
    pub(crate) records: BTreeMap<String, RecordCounters>,
}

///
/// EventTotals
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventTotals {
    // Request pipeline
    pub filters_parsed: u64,
    pub filters_rejected: u64,
    pub filters_compiled: u64,
    pub compile_failures: u64,
    pub nodes_parsed: u64,

    // Evaluation
    pub records_scanned: u64,
    pub records_matched: u64,
}

///
/// RecordCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RecordCounters {
    pub filters_parsed: u64,
    pub filters_rejected: u64,
    pub filters_compiled: u64,
    pub compile_failures: u64,
    pub records_scanned: u64,
    pub records_matched: u64,
}

///
/// EventReport
/// Point-in-time snapshot of the metrics state.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub totals: EventTotals,
    pub records: BTreeMap<String, RecordCounters>,
}

impl EventReport {
    /// Counters for one record type, if it has been seen.
    #[must_use]
    pub fn record(&self, record_type: &str) -> Option<&RecordCounters> {
        self.records.get(record_type)
    }
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Snapshot the current state.
pub(crate) fn report() -> EventReport {
    with_state(|m| EventReport {
        totals: m.totals.clone(),
        records: m.records.clone(),
    })
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}
