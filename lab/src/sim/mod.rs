//! Simulated resources and the execution trace.
//!
//! Everything here is in-memory and owned by a single executor session.
//! Nothing touches the host filesystem or any database.

pub mod db;
pub mod error;
pub mod fs;
pub mod resources;
pub mod trace;
