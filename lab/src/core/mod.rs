//! Deterministic, pure data model shared by the execution core.
//!
//! Core modules must be free of side effects. They describe the inputs the
//! executor accepts, the verdicts a gate may return, and the results the
//! executor hands back.

pub mod bundle;
pub mod context;
pub mod outcome;
pub mod value;
pub mod verdict;
