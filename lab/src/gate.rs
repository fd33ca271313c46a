//! Admissibility gate contract.
//!
//! A gate sees every bundle before it can touch state and answers with a
//! [`Verdict`]. The executor depends only on the [`Gate`] trait; concrete
//! policies live outside this crate.
//!
//! A conformant gate is:
//! - **Pure**: the same bundle and snapshot always yield the same verdict.
//! - **Side-effect free**: both inputs are shared borrows and stay untouched.
//! - **Total**: every syntactically valid bundle gets one of the three
//!   verdicts. A gate that cannot decide answers [`Verdict::Hold`].

use serde::Serialize;
use thiserror::Error;

use crate::core::bundle::ActionBundle;
use crate::core::verdict::Verdict;
use crate::sim::db::Tables;
use crate::sim::fs::Directory;

/// Read-only, copy-isolated view handed to a gate.
///
/// Owns deep copies of both stores, so nothing a gate does with it can reach
/// live state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSnapshot {
    pub filesystem: Directory,
    pub database: Tables,
    /// Effective role (`context_fields.user_role`, else the configured default).
    pub permissions: String,
    /// Effective environment (`context_fields.environment`, else the configured default).
    pub mode: String,
}

impl ContextSnapshot {
    /// Empty stores with the stock `admin`/`production` fallbacks.
    pub fn empty() -> Self {
        Self {
            filesystem: Directory::new(),
            database: Tables::new(),
            permissions: "admin".to_string(),
            mode: "production".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// The policy-free [`BaseGate`] was asked for a decision.
    #[error("Gate::evaluate must be implemented by a concrete gate")]
    Unimplemented,

    /// The gate broke its contract (e.g. an internal fault while deciding).
    #[error("gate failed: {0}")]
    Failed(String),
}

pub trait Gate {
    fn evaluate(
        &self,
        bundle: &ActionBundle,
        snapshot: &ContextSnapshot,
    ) -> Result<Verdict, GateError>;
}

impl<G: Gate + ?Sized> Gate for &G {
    fn evaluate(
        &self,
        bundle: &ActionBundle,
        snapshot: &ContextSnapshot,
    ) -> Result<Verdict, GateError> {
        (**self).evaluate(bundle, snapshot)
    }
}

impl<G: Gate + ?Sized> Gate for Box<G> {
    fn evaluate(
        &self,
        bundle: &ActionBundle,
        snapshot: &ContextSnapshot,
    ) -> Result<Verdict, GateError> {
        (**self).evaluate(bundle, snapshot)
    }
}

/// Policy-free gate. Always fails with [`GateError::Unimplemented`].
///
/// Exists so conformance suites can tell an implementation that overrides
/// `evaluate` from one that does not. It is not a fallback policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseGate;

impl Gate for BaseGate {
    fn evaluate(
        &self,
        _bundle: &ActionBundle,
        _snapshot: &ContextSnapshot,
    ) -> Result<Verdict, GateError> {
        Err(GateError::Unimplemented)
    }
}
