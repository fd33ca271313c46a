//! Deterministic execution trace.
//!
//! The trace is the product audit trail of a session: no timestamps, one
//! gapless sequence starting at 1, ordered exactly as events were logged.
//! Developer diagnostics go through `tracing` instead (see `crate::logging`).

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub const GATE: &str = "GATE";
pub const EXEC_START: &str = "EXEC_START";
pub const EXEC_END: &str = "EXEC_END";
pub const EXEC_ERROR: &str = "EXEC_ERROR";
pub const WRITE: &str = "WRITE";
pub const DELETE: &str = "DELETE";
pub const UPDATE: &str = "UPDATE";
pub const RESOLVE: &str = "RESOLVE";
pub const OPTIMIZE: &str = "OPTIMIZE";
pub const BATCH_STEP: &str = "BATCH_STEP";
pub const BACKUP: &str = "BACKUP";
pub const SYNC: &str = "SYNC";
pub const SIDE_EFFECT: &str = "SIDE_EFFECT";
pub const ROTATE: &str = "ROTATE";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEvent {
    pub sequence: u64,
    pub event_type: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct TraceLog {
    events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event with the next sequence number and return that number.
    pub fn log(
        &mut self,
        event_type: &str,
        detail: impl Into<String>,
        data: Option<Value>,
    ) -> u64 {
        let sequence = self.events.len() as u64 + 1;
        let detail = detail.into();
        debug!(sequence, event_type, detail = %detail, "trace");
        self.events.push(TraceEvent {
            sequence,
            event_type: event_type.to_string(),
            detail,
            data,
        });
        sequence
    }

    /// Owned copy of the events logged so far.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.clone()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events with the given tag, in log order.
    pub fn of_type(&self, event_type: &str) -> Vec<&TraceEvent> {
        self.events
            .iter()
            .filter(|event| event.event_type == event_type)
            .collect()
    }

    pub fn reset(&mut self) {
        self.events.clear();
    }

    /// Render one line per event: `[0001] EVENT: detail | data`.
    pub fn format_trace(&self) -> String {
        self.events
            .iter()
            .map(|event| match &event.data {
                Some(data) => format!(
                    "[{:04}] {}: {} | {}",
                    event.sequence, event.event_type, event.detail, data
                ),
                None => format!(
                    "[{:04}] {}: {}",
                    event.sequence, event.event_type, event.detail
                ),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sequence_is_contiguous_from_one() {
        let mut trace = TraceLog::new();
        for idx in 0..5 {
            trace.log(EXEC_START, format!("event {idx}"), None);
        }
        let sequences: Vec<u64> = trace.events().iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn returned_events_are_snapshots() {
        let mut trace = TraceLog::new();
        trace.log(GATE, "verdict=ALLOW", None);
        let held = trace.events();
        trace.log(EXEC_START, "op=write target=/x", None);
        trace.reset();

        assert_eq!(held.len(), 1);
        assert_eq!(held[0].event_type, GATE);
    }

    #[test]
    fn reset_restarts_sequence() {
        let mut trace = TraceLog::new();
        trace.log(WRITE, "a", None);
        trace.log(WRITE, "b", None);
        trace.reset();
        assert!(trace.is_empty());
        assert_eq!(trace.log(WRITE, "c", None), 1);
    }

    #[test]
    fn format_trace_pads_sequence_and_appends_data() {
        let mut trace = TraceLog::new();
        trace.log(EXEC_START, "op=delete target=/temp", None);
        trace.log(DELETE, "deleted /temp", Some(json!({"recursive": true})));

        assert_eq!(
            trace.format_trace(),
            "[0001] EXEC_START: op=delete target=/temp\n\
             [0002] DELETE: deleted /temp | {\"recursive\":true}"
        );
    }

    #[test]
    fn serialized_event_omits_missing_data() {
        let mut trace = TraceLog::new();
        trace.log(BACKUP, "snapshot created", None);
        let encoded = serde_json::to_value(&trace.events()[0]).expect("encode");
        assert_eq!(
            encoded,
            json!({"sequence": 1, "event_type": "BACKUP", "detail": "snapshot created"})
        );
    }
}
