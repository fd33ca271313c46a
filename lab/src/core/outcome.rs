//! Results returned by the executor.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::core::verdict::Verdict;

/// Top-level outcome class of an `execute` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    Ok,
    Blocked,
    Error,
}

impl ExecStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecStatus::Ok => "ok",
            ExecStatus::Blocked => "blocked",
            ExecStatus::Error => "error",
        }
    }
}

impl fmt::Display for ExecStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation-specific fields of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpOutcome {
    Wrote {
        path: String,
    },
    Deleted {
        path: String,
        recursive: bool,
    },
    /// `record` is `<table>/<record id>`.
    Updated {
        record: String,
    },
    /// Sub-operation names in executed order; `None` for a step without `op`.
    Batch {
        executed: Vec<Option<String>>,
    },
    Synced {
        target: String,
        environment: String,
        mirror: bool,
    },
}

/// Result of one `execute` call. Never an `Err`: failures are values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecResult {
    Ok(OpOutcome),
    Blocked { verdict: Verdict },
    Error { reason: String },
}

impl ExecResult {
    pub fn error(reason: impl Into<String>) -> Self {
        ExecResult::Error {
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> ExecStatus {
        match self {
            ExecResult::Ok(_) => ExecStatus::Ok,
            ExecResult::Blocked { .. } => ExecStatus::Blocked,
            ExecResult::Error { .. } => ExecStatus::Error,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status() == ExecStatus::Ok
    }

    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            ExecResult::Blocked { verdict } => Some(*verdict),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ExecResult::Error { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<&OpOutcome> {
        match self {
            ExecResult::Ok(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Flat JSON form, e.g. `{"status": "ok", "deleted": "/temp", "recursive": true}`.
    pub fn to_json(&self) -> serde_json::Value {
        // Serializing plain strings, bools and lists cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for ExecResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("status", self.status().as_str())?;
        match self {
            ExecResult::Ok(OpOutcome::Wrote { path }) => {
                map.serialize_entry("wrote", path)?;
            }
            ExecResult::Ok(OpOutcome::Deleted { path, recursive }) => {
                map.serialize_entry("deleted", path)?;
                map.serialize_entry("recursive", recursive)?;
            }
            ExecResult::Ok(OpOutcome::Updated { record }) => {
                map.serialize_entry("updated", record)?;
            }
            ExecResult::Ok(OpOutcome::Batch { executed }) => {
                map.serialize_entry("executed", executed)?;
            }
            ExecResult::Ok(OpOutcome::Synced {
                target,
                environment,
                mirror,
            }) => {
                map.serialize_entry("synced", target)?;
                map.serialize_entry("environment", environment)?;
                map.serialize_entry("mirror", mirror)?;
            }
            ExecResult::Blocked { verdict } => {
                map.serialize_entry("verdict", verdict)?;
            }
            ExecResult::Error { reason } => {
                map.serialize_entry("reason", reason)?;
            }
        }
        map.end()
    }
}
