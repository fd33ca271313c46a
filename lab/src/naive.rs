//! Baseline execution with no admissibility check.

use crate::core::bundle::ActionBundle;
use crate::core::outcome::ExecResult;
use crate::executor::Executor;
use crate::sim::resources::ResourceManager;
use crate::sim::trace::TraceLog;

/// Everything a naive run leaves behind.
#[derive(Debug, Clone)]
pub struct NaiveRun {
    pub result: ExecResult,
    pub resources: ResourceManager,
    pub trace: TraceLog,
}

/// Execute `bundle` with no gate against `resources` and `trace`.
///
/// Missing resources or trace start fresh. Both are handed back so callers
/// can inspect the state the bundle left behind.
pub fn run_naive(
    bundle: &ActionBundle,
    resources: Option<ResourceManager>,
    trace: Option<TraceLog>,
) -> NaiveRun {
    let mut executor = Executor::new(
        resources.unwrap_or_default(),
        trace.unwrap_or_default(),
        None,
    );
    let result = executor.execute(bundle);
    let (resources, trace) = executor.into_parts();
    NaiveRun {
        result,
        resources,
        trace,
    }
}
