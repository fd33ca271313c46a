//! Effective execution context.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::value::{is_truthy, present_label};

/// Defaults merged under every bundle's `context_fields`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContextDefaults {
    pub recursive: bool,
    pub optimize: bool,
    pub priority: String,
}

impl Default for ContextDefaults {
    fn default() -> Self {
        Self {
            recursive: false,
            optimize: false,
            priority: "normal".to_string(),
        }
    }
}

/// `defaults ∪ context_fields`, with caller keys winning on conflict.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveContext {
    fields: Map<String, Value>,
}

impl EffectiveContext {
    pub fn merge(defaults: &ContextDefaults, context_fields: &Map<String, Value>) -> Self {
        let mut fields = Map::new();
        fields.insert("recursive".to_string(), Value::Bool(defaults.recursive));
        fields.insert("optimize".to_string(), Value::Bool(defaults.optimize));
        fields.insert(
            "priority".to_string(),
            Value::String(defaults.priority.clone()),
        );
        for (key, value) in context_fields {
            fields.insert(key.clone(), value.clone());
        }
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn recursive(&self) -> bool {
        self.get("recursive").is_some_and(is_truthy)
    }

    pub fn optimize(&self) -> bool {
        self.get("optimize").is_some_and(is_truthy)
    }

    /// Caller-declared role, if any. An explicit `null` counts as undeclared.
    pub fn user_role(&self) -> Option<String> {
        self.get("user_role").and_then(present_label)
    }

    /// Caller-declared environment, if any.
    pub fn environment(&self) -> Option<String> {
        self.get("environment").and_then(present_label)
    }
}
