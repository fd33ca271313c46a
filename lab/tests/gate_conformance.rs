//! Gate contract and gated-execution tests.
//!
//! These pin down what any gate must satisfy to be plugged into the
//! executor, and how the executor treats each verdict. They exercise the
//! trivial gates from `test_support`, never a real policy.

use lab::core::bundle::ActionBundle;
use lab::core::outcome::{ExecResult, ExecStatus};
use lab::core::verdict::Verdict;
use lab::executor::Executor;
use lab::gate::{BaseGate, ContextSnapshot, Gate, GateError};
use lab::sim::trace::GATE;
use lab::test_support::{
    AllowAllGate, CountingGate, DenyAllGate, HoldAllGate, SelectiveGate, clean_case_1,
    contaminated_case_1, contaminated_cases,
};
use serde_json::json;

fn conformant_gates() -> Vec<(&'static str, Box<dyn Gate>)> {
    vec![
        ("allow_all", Box::new(AllowAllGate)),
        ("deny_all", Box::new(DenyAllGate)),
        ("hold_all", Box::new(HoldAllGate)),
        ("selective", Box::new(SelectiveGate)),
    ]
}

fn snapshot_with_state() -> ContextSnapshot {
    let mut resources = lab::sim::resources::ResourceManager::new();
    resources
        .fs
        .write("/shared/config.yaml", json!({"mode": "strict"}))
        .expect("seed");
    let mut snapshot = ContextSnapshot::empty();
    snapshot.filesystem = resources.fs.snapshot();
    snapshot
}

#[test]
fn base_gate_signals_unimplemented() {
    let result = BaseGate.evaluate(&ActionBundle::new("write", "/tmp"), &ContextSnapshot::empty());
    assert_eq!(result, Err(GateError::Unimplemented));
}

#[test]
fn conformant_gates_return_a_valid_verdict_for_every_case() {
    let mut bundles: Vec<ActionBundle> = contaminated_cases()
        .into_iter()
        .map(|(_, bundle)| bundle)
        .collect();
    bundles.push(clean_case_1());
    bundles.push(ActionBundle::new("truncate", "/anything"));

    for (name, gate) in conformant_gates() {
        for bundle in &bundles {
            let verdict = gate
                .evaluate(bundle, &ContextSnapshot::empty())
                .unwrap_or_else(|err| panic!("{name} failed to decide: {err}"));
            assert!(Verdict::VALID_VERDICTS.contains(&verdict), "{name}");
        }
    }
}

#[test]
fn conformant_gates_are_deterministic() {
    let bundle = ActionBundle::new("write", "/data");
    let snapshot = snapshot_with_state();
    for (name, gate) in conformant_gates() {
        let first = gate.evaluate(&bundle, &snapshot);
        let second = gate.evaluate(&bundle, &snapshot);
        assert_eq!(first, second, "{name}");
    }
}

#[test]
fn gates_leave_bundle_and_snapshot_untouched() {
    let bundle = ActionBundle::new("write", "/shared/x").with_payload(json!({"data": 1}));
    let snapshot = snapshot_with_state();
    let bundle_before = bundle.clone();
    let snapshot_before = snapshot.clone();

    for (_, gate) in conformant_gates() {
        gate.evaluate(&bundle, &snapshot).expect("verdict");
    }

    assert_eq!(bundle, bundle_before);
    assert_eq!(snapshot, snapshot_before);
}

#[test]
fn allow_gate_permits_execution() {
    let mut executor = Executor::gated(AllowAllGate);
    let result = executor.execute(&contaminated_case_1());
    assert_eq!(result.status(), ExecStatus::Ok);
    assert!(executor.resources().fs.exists("/shared/config.yaml"));
}

#[test]
fn deny_gate_blocks_execution() {
    let mut executor = Executor::gated(DenyAllGate);
    let result = executor.execute(&contaminated_case_1());
    assert_eq!(
        result.to_json(),
        json!({"status": "blocked", "verdict": "DENY"})
    );
    assert!(!executor.resources().fs.exists("/shared/config.yaml"));
}

#[test]
fn hold_gate_blocks_execution_like_deny() {
    let mut executor = Executor::gated(HoldAllGate);
    let result = executor.execute(&contaminated_case_1());
    assert_eq!(
        result,
        ExecResult::Blocked {
            verdict: Verdict::Hold
        }
    );
    assert!(!executor.resources().fs.exists("/shared/config.yaml"));
}

#[test]
fn selective_gate_blocks_shared_write_only() {
    let mut executor = Executor::gated(SelectiveGate);

    let shared = executor.execute(&contaminated_case_1());
    assert_eq!(shared.verdict(), Some(Verdict::Deny));

    let clean = executor.execute(&clean_case_1());
    assert_eq!(clean.status(), ExecStatus::Ok);
    assert!(executor.resources().fs.exists("/user/local/notes.txt"));
    assert!(!executor.resources().fs.exists("/shared/config.yaml"));
}

#[test]
fn gate_verdict_is_logged() {
    let mut executor = Executor::gated(DenyAllGate);
    executor.execute(&contaminated_case_1());

    let gate_events = executor.trace().of_type(GATE);
    assert_eq!(gate_events.len(), 1);
    assert!(gate_events[0].detail.contains("DENY"));
    assert_eq!(executor.trace().len(), 1);
}

#[test]
fn blocking_gates_never_mutate_the_store() {
    for blocking in [Verdict::Deny, Verdict::Hold] {
        for (name, bundle) in contaminated_cases() {
            let gate = CountingGate::new(blocking);
            let mut executor = Executor::gated(&gate);
            seed_everything(&mut executor);
            let before = serde_json::to_string(&executor.resources().snapshot()).expect("encode");

            let result = executor.execute(&bundle);

            let after = serde_json::to_string(&executor.resources().snapshot()).expect("encode");
            assert_eq!(result.verdict(), Some(blocking), "{name}");
            assert_eq!(before, after, "{name} mutated state under {blocking}");
            assert_eq!(gate.seen().len(), 1);
        }
    }
}

#[test]
fn mutating_a_gate_snapshot_does_not_reach_live_state() {
    let gate = CountingGate::new(Verdict::Allow);
    let mut executor = Executor::gated(&gate);
    seed_everything(&mut executor);
    executor.execute(&ActionBundle::new("sync", "/mirror"));

    let mut seen = gate.seen();
    seen[0].filesystem.clear();
    seen[0].database.clear();

    assert!(executor.resources().fs.exists("/temp/a/file1.txt"));
    assert!(executor.resources().db.find_first("user_record").is_ok());
}

fn seed_everything(executor: &mut Executor<'_>) {
    let resources = executor.resources_mut();
    resources
        .fs
        .write("/temp/a/file1.txt", json!("data1"))
        .expect("seed");
    resources
        .fs
        .write("/logs/system.log.old", json!("old log data"))
        .expect("seed");
    resources
        .fs
        .write("/data/db.bin", json!("bytes"))
        .expect("seed");
    resources.db.insert(
        "user_record",
        "staging_001",
        lab::test_support::record(json!({"status": "active", "env": "staging"})),
    );
}
