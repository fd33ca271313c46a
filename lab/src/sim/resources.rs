//! Aggregate of every simulated resource.

use serde::Serialize;

use crate::sim::db::{Database, Tables};
use crate::sim::fs::{Directory, Filesystem};

/// Point-in-time copy of all resources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSnapshot {
    pub filesystem: Directory,
    pub database: Tables,
}

/// Filesystem plus table store, owned by one executor session.
#[derive(Debug, Clone, Default)]
pub struct ResourceManager {
    pub fs: Filesystem,
    pub db: Database,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot {
            filesystem: self.fs.snapshot(),
            database: self.db.snapshot(),
        }
    }
}
