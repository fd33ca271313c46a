//! Deterministic execution-boundary simulator for action bundles.
//!
//! This crate executes structured mutation requests ("action bundles") against
//! an in-memory resource store and records every step to an ordered trace log.
//! An optional admissibility gate sees each bundle before it can touch state.
//! The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic data model (bundles, verdicts, effective
//!   context, results). No state, fully testable in isolation.
//! - **[`sim`]**: The simulated resources and the trace log. In-memory only,
//!   owned by a single executor session.
//!
//! Orchestration ([`executor`], [`naive`]) ties the gate contract ([`gate`])
//! to the simulated resources.

pub mod config;
pub mod core;
pub mod executor;
pub mod gate;
pub mod logging;
pub mod naive;
pub mod sim;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
