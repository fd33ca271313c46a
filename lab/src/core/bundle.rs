//! Action bundles: the structured requests the executor consumes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Operation requested by a bundle.
///
/// Unrecognized names are kept verbatim in [`OperationType::Unknown`] so the
/// executor can report them instead of rejecting the bundle at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationType {
    Write,
    Delete,
    Update,
    Batch,
    Sync,
    Unknown(String),
}

impl OperationType {
    pub fn as_str(&self) -> &str {
        match self {
            OperationType::Write => "write",
            OperationType::Delete => "delete",
            OperationType::Update => "update",
            OperationType::Batch => "batch",
            OperationType::Sync => "sync",
            OperationType::Unknown(name) => name,
        }
    }
}

impl From<String> for OperationType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "write" => OperationType::Write,
            "delete" => OperationType::Delete,
            "update" => OperationType::Update,
            "batch" => OperationType::Batch,
            "sync" => OperationType::Sync,
            _ => OperationType::Unknown(name),
        }
    }
}

impl From<&str> for OperationType {
    fn from(name: &str) -> Self {
        OperationType::from(name.to_string())
    }
}

impl From<OperationType> for String {
    fn from(op: OperationType) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request to mutate simulated resources.
///
/// Field names are part of the interchange format and must stay verbatim.
/// The executor and gates only ever borrow a bundle immutably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBundle {
    pub operation_type: OperationType,
    #[serde(default)]
    pub target_resource: String,
    /// Operation-specific body: a mapping, or a sequence of sub-operations
    /// for `batch`.
    #[serde(default = "empty_object")]
    pub payload: Value,
    /// Operation-scoped hints.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Caller-asserted execution context (role, environment, flags).
    #[serde(default)]
    pub context_fields: Map<String, Value>,
}

impl ActionBundle {
    pub fn new(operation_type: impl Into<OperationType>, target_resource: impl Into<String>) -> Self {
        Self {
            operation_type: operation_type.into(),
            target_resource: target_resource.into(),
            payload: empty_object(),
            metadata: Map::new(),
            context_fields: Map::new(),
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context_fields.insert(key.to_string(), value.into());
        self
    }

    /// Decode a bundle from its JSON representation.
    pub fn from_json(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
