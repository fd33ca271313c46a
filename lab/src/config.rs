//! Executor configuration (TOML).

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::context::ContextDefaults;
use crate::sim::fs::parse_path;

/// Knobs for the execution core.
///
/// Missing fields default to the stock simulator behavior, so an empty document
/// is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LabConfig {
    /// Role reported to gates when the bundle declares no `user_role`.
    pub default_role: String,

    /// Mode reported to gates when the bundle declares no `environment`.
    pub default_mode: String,

    /// Environment used by `sync` when neither metadata nor context name one.
    pub sync_fallback_environment: String,

    /// File purged by the critical-priority side effect of `write`.
    pub rotation_path: String,

    /// Target name that redirects batch `delete` steps to `batch_multi_path`.
    pub batch_multi_target: String,

    pub batch_multi_path: String,

    pub defaults: ContextDefaults,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            default_role: "admin".to_string(),
            default_mode: "production".to_string(),
            sync_fallback_environment: "staging".to_string(),
            rotation_path: "/logs/system.log.old".to_string(),
            batch_multi_target: "multi".to_string(),
            batch_multi_path: "/data".to_string(),
            defaults: ContextDefaults::default(),
        }
    }
}

impl LabConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("default_role", &self.default_role),
            ("default_mode", &self.default_mode),
            ("sync_fallback_environment", &self.sync_fallback_environment),
            ("batch_multi_target", &self.batch_multi_target),
            ("defaults.priority", &self.defaults.priority),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("{name} must be non-empty"));
            }
        }
        parse_path(&self.rotation_path)
            .map_err(|err| anyhow!("rotation_path is not a store path: {err}"))?;
        parse_path(&self.batch_multi_path)
            .map_err(|err| anyhow!("batch_multi_path is not a store path: {err}"))?;
        Ok(())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let cfg: LabConfig = toml::from_str(contents).context("parse lab config")?;
        cfg.validate()?;
        Ok(cfg)
    }
}
