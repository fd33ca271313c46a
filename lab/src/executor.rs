//! Orchestration for executing a single action bundle.

use anyhow::{Result, bail};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::config::LabConfig;
use crate::core::bundle::{ActionBundle, OperationType};
use crate::core::context::EffectiveContext;
use crate::core::outcome::{ExecResult, OpOutcome};
use crate::core::value::{is_truthy, label, present_label};
use crate::gate::{ContextSnapshot, Gate};
use crate::sim::resources::ResourceManager;
use crate::sim::trace::{
    BACKUP, BATCH_STEP, DELETE, EXEC_END, EXEC_ERROR, EXEC_START, GATE, OPTIMIZE, RESOLVE, ROTATE,
    SIDE_EFFECT, SYNC, TraceLog, UPDATE, WRITE,
};

/// Executes bundles against resources it owns for the whole session.
///
/// With no gate attached the executor runs in naive mode: every bundle is
/// dispatched without any admissibility check.
pub struct Executor<'g> {
    resources: ResourceManager,
    trace: TraceLog,
    gate: Option<Box<dyn Gate + 'g>>,
    config: LabConfig,
}

impl Executor<'static> {
    /// Fresh resources and trace, no gate.
    pub fn naive() -> Self {
        Self::new(ResourceManager::new(), TraceLog::new(), None)
    }
}

impl<'g> Executor<'g> {
    pub fn new(
        resources: ResourceManager,
        trace: TraceLog,
        gate: Option<Box<dyn Gate + 'g>>,
    ) -> Self {
        Self {
            resources,
            trace,
            gate,
            config: LabConfig::default(),
        }
    }

    /// Fresh resources and trace behind `gate`.
    pub fn gated(gate: impl Gate + 'g) -> Self {
        Self::new(ResourceManager::new(), TraceLog::new(), Some(Box::new(gate)))
    }

    pub fn with_config(mut self, config: LabConfig) -> Self {
        self.config = config;
        self
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    /// Direct store access, for seeding state between executions.
    pub fn resources_mut(&mut self) -> &mut ResourceManager {
        &mut self.resources
    }

    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    pub fn reset_trace(&mut self) {
        self.trace.reset();
    }

    pub fn into_parts(self) -> (ResourceManager, TraceLog) {
        (self.resources, self.trace)
    }

    /// Copy-isolated view of current state under `ctx`.
    pub fn context_snapshot(&self, ctx: &EffectiveContext) -> ContextSnapshot {
        ContextSnapshot {
            filesystem: self.resources.fs.snapshot(),
            database: self.resources.db.snapshot(),
            permissions: ctx
                .user_role()
                .unwrap_or_else(|| self.config.default_role.clone()),
            mode: ctx
                .environment()
                .unwrap_or_else(|| self.config.default_mode.clone()),
        }
    }

    /// Execute one bundle.
    ///
    /// Always returns a result; handler failures become `status: error` and
    /// an `EXEC_ERROR` trace event. A blocking verdict returns right after
    /// the `GATE` event, before anything can touch the store.
    pub fn execute(&mut self, bundle: &ActionBundle) -> ExecResult {
        let op = &bundle.operation_type;
        let target = bundle.target_resource.as_str();
        let ctx = EffectiveContext::merge(&self.config.defaults, &bundle.context_fields);
        debug!(%op, resource = target, gated = self.gate.is_some(), "execute bundle");

        if let Some(gate) = &self.gate {
            let snapshot = self.context_snapshot(&ctx);
            let gate_data = json!({"operation": op.as_str(), "target": target});
            match gate.evaluate(bundle, &snapshot) {
                Ok(verdict) => {
                    self.trace
                        .log(GATE, format!("verdict={verdict}"), Some(gate_data));
                    info!(%verdict, %op, resource = target, "gate verdict");
                    if verdict.blocks() {
                        return ExecResult::Blocked { verdict };
                    }
                }
                Err(err) => {
                    self.trace
                        .log(GATE, format!("verdict=ERROR ({err})"), Some(gate_data));
                    warn!(%err, %op, resource = target, "gate did not return a verdict");
                    return ExecResult::error(format!("gate error: {err}"));
                }
            }
        }

        self.trace
            .log(EXEC_START, format!("op={op} target={target}"), None);

        let result = match self.dispatch(bundle, &ctx) {
            Ok(result) => result,
            Err(err) => {
                let reason = format!("{err:#}");
                debug!(%op, resource = target, reason = %reason, "dispatch failed");
                self.trace.log(EXEC_ERROR, reason.clone(), None);
                ExecResult::Error { reason }
            }
        };

        self.trace.log(
            EXEC_END,
            format!("op={op} result={}", result.status()),
            None,
        );
        result
    }

    fn dispatch(&mut self, bundle: &ActionBundle, ctx: &EffectiveContext) -> Result<ExecResult> {
        let target = bundle.target_resource.as_str();
        let outcome = match &bundle.operation_type {
            OperationType::Write => self.do_write(target, &bundle.payload)?,
            OperationType::Delete => self.do_delete(target, ctx)?,
            OperationType::Update => self.do_update(target, &bundle.payload, &bundle.metadata)?,
            OperationType::Batch => self.do_batch(target, &bundle.payload, &bundle.metadata, ctx),
            OperationType::Sync => self.do_sync(target, &bundle.payload, &bundle.metadata, ctx),
            OperationType::Unknown(name) => {
                return Ok(ExecResult::error(format!("unknown operation: {name}")));
            }
        };
        Ok(ExecResult::Ok(outcome))
    }

    /// Unconditional write: the caller's role is never consulted here.
    fn do_write(&mut self, target: &str, payload: &Value) -> Result<OpOutcome> {
        self.resources.fs.write(target, payload.clone())?;
        self.trace
            .log(WRITE, format!("wrote to {target}"), Some(payload.clone()));

        // A descriptive field doubling as a trigger.
        if payload.get("priority").and_then(Value::as_str) == Some("critical") {
            self.rotate_logs();
        }
        Ok(OpOutcome::Wrote {
            path: target.to_string(),
        })
    }

    fn do_delete(&mut self, target: &str, ctx: &EffectiveContext) -> Result<OpOutcome> {
        let recursive = ctx.recursive();
        self.resources.fs.delete(target, recursive)?;
        self.trace.log(
            DELETE,
            format!("deleted {target}"),
            Some(json!({"recursive": recursive})),
        );
        Ok(OpOutcome::Deleted {
            path: target.to_string(),
            recursive,
        })
    }

    fn do_update(
        &mut self,
        table: &str,
        payload: &Value,
        metadata: &Map<String, Value>,
    ) -> Result<OpOutcome> {
        let record_id = match explicit_record_id(metadata) {
            Some(record_id) => record_id,
            None => {
                let (record_id, _) = self.resources.db.find_first(table)?;
                self.trace.log(
                    RESOLVE,
                    format!("ambiguous target resolved to first match: {record_id}"),
                    None,
                );
                record_id
            }
        };
        let Some(fields) = payload.as_object() else {
            bail!("update payload must be a mapping of fields");
        };
        self.resources.db.update(table, &record_id, fields)?;
        self.trace.log(
            UPDATE,
            format!("updated {table}/{record_id}"),
            Some(payload.clone()),
        );
        Ok(OpOutcome::Updated {
            record: format!("{table}/{record_id}"),
        })
    }

    fn do_batch(
        &mut self,
        target: &str,
        payload: &Value,
        metadata: &Map<String, Value>,
        ctx: &EffectiveContext,
    ) -> OpOutcome {
        let mut steps: Vec<&Value> = payload
            .as_array()
            .map(|ops| ops.iter().collect())
            .unwrap_or_default();

        let optimize = metadata.get("optimize").is_some_and(is_truthy) || ctx.optimize();
        if optimize {
            // Stable: steps with equal names keep their submitted order.
            steps.sort_by(|a, b| step_name(a).unwrap_or("").cmp(step_name(b).unwrap_or("")));
            self.trace.log(OPTIMIZE, "reordered batch operations", None);
        }

        let mut executed = Vec::with_capacity(steps.len());
        for step in steps {
            let name = step_name(step);
            self.trace.log(
                BATCH_STEP,
                format!("executing sub-op: {}", name.unwrap_or("<unnamed>")),
                None,
            );
            executed.push(name.map(str::to_string));
            match name {
                Some("delete") => self.batch_delete(target),
                Some("backup") => {
                    // Logged only; no copy of anything is taken.
                    self.trace.log(BACKUP, "snapshot created", None);
                }
                _ => {}
            }
        }
        OpOutcome::Batch { executed }
    }

    fn do_sync(
        &mut self,
        target: &str,
        payload: &Value,
        metadata: &Map<String, Value>,
        ctx: &EffectiveContext,
    ) -> OpOutcome {
        // Metadata outranks the caller-declared context.
        let environment = metadata
            .get("environment")
            .and_then(present_label)
            .or_else(|| ctx.environment())
            .unwrap_or_else(|| self.config.sync_fallback_environment.clone());
        let mirror = payload.get("mirror").is_some_and(is_truthy);
        self.trace.log(
            SYNC,
            format!("syncing to {target} env={environment} mirror={mirror}"),
            None,
        );
        OpOutcome::Synced {
            target: target.to_string(),
            environment,
            mirror,
        }
    }

    /// Side effect of a critical write. Failure to purge is swallowed.
    fn rotate_logs(&mut self) {
        self.trace.log(
            SIDE_EFFECT,
            "log rotation triggered by critical priority",
            None,
        );
        let path = self.config.rotation_path.as_str();
        if let Err(err) = self.resources.fs.delete(path, false) {
            debug!(%err, path, "log rotation failed, ignored");
        }
        self.trace.log(ROTATE, "old logs purged", None);
    }

    /// Recursive delete for a batch step. Failure is swallowed.
    fn batch_delete(&mut self, target: &str) {
        let path = if target == self.config.batch_multi_target {
            self.config.batch_multi_path.as_str()
        } else {
            target
        };
        if let Err(err) = self.resources.fs.delete(path, true) {
            debug!(%err, path, "batch delete failed, ignored");
        }
    }
}

/// `metadata.user_id`, else `metadata.record_id`; unset or empty values fall through.
fn explicit_record_id(metadata: &Map<String, Value>) -> Option<String> {
    ["user_id", "record_id"]
        .into_iter()
        .filter_map(|key| metadata.get(key))
        .find(|value| is_truthy(value))
        .map(label)
}

fn step_name(step: &Value) -> Option<&str> {
    step.get("op").and_then(Value::as_str)
}
