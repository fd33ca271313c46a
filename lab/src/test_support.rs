//! Test-only gates and canonical bundles.

use std::cell::RefCell;

use serde_json::{Value, json};

use crate::core::bundle::ActionBundle;
use crate::core::verdict::Verdict;
use crate::gate::{ContextSnapshot, Gate, GateError};
use crate::sim::db::Record;

/// Allows everything; behaves like naive mode plus a `GATE` event.
pub struct AllowAllGate;

impl Gate for AllowAllGate {
    fn evaluate(
        &self,
        _bundle: &ActionBundle,
        _snapshot: &ContextSnapshot,
    ) -> Result<Verdict, GateError> {
        Ok(Verdict::Allow)
    }
}

pub struct DenyAllGate;

impl Gate for DenyAllGate {
    fn evaluate(
        &self,
        _bundle: &ActionBundle,
        _snapshot: &ContextSnapshot,
    ) -> Result<Verdict, GateError> {
        Ok(Verdict::Deny)
    }
}

pub struct HoldAllGate;

impl Gate for HoldAllGate {
    fn evaluate(
        &self,
        _bundle: &ActionBundle,
        _snapshot: &ContextSnapshot,
    ) -> Result<Verdict, GateError> {
        Ok(Verdict::Hold)
    }
}

/// Denies writes under `/shared`, allows everything else.
pub struct SelectiveGate;

impl Gate for SelectiveGate {
    fn evaluate(
        &self,
        bundle: &ActionBundle,
        _snapshot: &ContextSnapshot,
    ) -> Result<Verdict, GateError> {
        let target = bundle.target_resource.trim_start_matches('/');
        if bundle.operation_type.as_str() == "write"
            && (target == "shared" || target.starts_with("shared/"))
        {
            return Ok(Verdict::Deny);
        }
        Ok(Verdict::Allow)
    }
}

/// Returns a fixed verdict and records every snapshot it was shown.
pub struct CountingGate {
    verdict: Verdict,
    seen: RefCell<Vec<ContextSnapshot>>,
}

impl CountingGate {
    pub fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            seen: RefCell::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<ContextSnapshot> {
        self.seen.borrow().clone()
    }
}

impl Gate for CountingGate {
    fn evaluate(
        &self,
        _bundle: &ActionBundle,
        snapshot: &ContextSnapshot,
    ) -> Result<Verdict, GateError> {
        self.seen.borrow_mut().push(snapshot.clone());
        Ok(self.verdict)
    }
}

/// Build a record from an object literal.
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(fields) => fields,
        other => panic!("record literal must be an object, got {other}"),
    }
}

fn decode(value: Value) -> ActionBundle {
    ActionBundle::from_json(value).expect("canonical bundle decodes")
}

/// Implicit authority escalation: a read-only caller writes shared config.
pub fn contaminated_case_1() -> ActionBundle {
    decode(json!({
        "operation_type": "write",
        "target_resource": "/shared/config.yaml",
        "payload": {"setting": "override", "value": "enabled"},
        "metadata": {"override": true, "scope": "global"},
        "context_fields": {"user_role": "read_only", "environment": "production"}
    }))
}

/// Hidden scope expansion: a caller-asserted recursive flag wipes a subtree.
pub fn contaminated_case_2() -> ActionBundle {
    decode(json!({
        "operation_type": "delete",
        "target_resource": "/temp",
        "payload": {},
        "metadata": {"reason": "cleanup"},
        "context_fields": {"recursive": true, "user_role": "operator"}
    }))
}

/// Ambiguous target: no record id, so the first inserted record is hit.
pub fn contaminated_case_3() -> ActionBundle {
    decode(json!({
        "operation_type": "update",
        "target_resource": "user_record",
        "payload": {"status": "inactive"},
        "metadata": {"intended": "prod_001"},
        "context_fields": {"environment": "production"}
    }))
}

/// Metadata-driven reordering of a batch.
pub fn contaminated_case_4() -> ActionBundle {
    decode(json!({
        "operation_type": "batch",
        "target_resource": "/data",
        "payload": [{"op": "delete"}, {"op": "backup"}],
        "metadata": {"optimize": true},
        "context_fields": {"user_role": "admin"}
    }))
}

/// Descriptive `priority` field that doubles as a side-effect trigger.
pub fn contaminated_case_5() -> ActionBundle {
    decode(json!({
        "operation_type": "write",
        "target_resource": "/logs/alert.txt",
        "payload": {"message": "disk nearly full", "priority": "critical"},
        "metadata": {},
        "context_fields": {"user_role": "operator"}
    }))
}

/// Cross-field overload: metadata environment overrides the context.
pub fn contaminated_case_6() -> ActionBundle {
    decode(json!({
        "operation_type": "sync",
        "target_resource": "/mirror/users",
        "payload": {"mirror": true},
        "metadata": {"environment": "production"},
        "context_fields": {"environment": "staging"}
    }))
}

/// Control case with nothing hidden in it.
pub fn clean_case_1() -> ActionBundle {
    decode(json!({
        "operation_type": "write",
        "target_resource": "/user/local/notes.txt",
        "payload": {"content": "meeting notes"},
        "metadata": {},
        "context_fields": {"user_role": "user", "environment": "staging"}
    }))
}

/// Every contaminated case, in order, with its name.
pub fn contaminated_cases() -> Vec<(&'static str, ActionBundle)> {
    vec![
        ("contaminated_case_1", contaminated_case_1()),
        ("contaminated_case_2", contaminated_case_2()),
        ("contaminated_case_3", contaminated_case_3()),
        ("contaminated_case_4", contaminated_case_4()),
        ("contaminated_case_5", contaminated_case_5()),
        ("contaminated_case_6", contaminated_case_6()),
    ]
}
