//! The unit of agent-invokable functionality.
//!
//! A capability declares:
//! - A stable name (the primary key everywhere in the toolkit)
//! - A category used by the filtering engine
//! - Annotations forwarded verbatim to the host
//! - Whether it is enabled by default
//! - An optional JSON Schema input contract
//!
//! and provides an async `execute` that performs its effect.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::api::ApiError;

/// Capability category, consumed by the filtering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapabilityCategory {
    /// Reads remote state only.
    Read,
    /// Mutates remote state.
    Write,
    /// Composes arbitrary remote operations ("all-API" capabilities).
    Dynamic,
}

impl CapabilityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityCategory::Read => "READ",
            CapabilityCategory::Write => "WRITE",
            CapabilityCategory::Dynamic => "DYNAMIC",
        }
    }
}

impl fmt::Display for CapabilityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive hints forwarded to the host verbatim.
///
/// Nothing in the toolkit core depends on these values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityAnnotations {
    /// Human-readable title shown by the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_hint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destructive_hint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotent_hint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_world_hint: Option<bool>,
}

impl CapabilityAnnotations {
    /// Annotations with just a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Mark as not modifying remote state.
    pub fn read_only(mut self) -> Self {
        self.read_only_hint = Some(true);
        self.destructive_hint = Some(false);
        self
    }

    /// Mark as able to delete or overwrite data.
    pub fn destructive(mut self) -> Self {
        self.read_only_hint = Some(false);
        self.destructive_hint = Some(true);
        self
    }

    /// Mark repeated calls with the same input as having no extra effect.
    pub fn idempotent(mut self) -> Self {
        self.idempotent_hint = Some(true);
        self
    }
}

/// The value a capability body produces on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityOutput {
    /// Text content handed back to the agent.
    pub content: String,
    /// Optional structured metadata; never shown to the agent by the host path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl CapabilityOutput {
    /// Plain text output with no metadata.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Failures raised from inside a capability body.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// Arguments passed the input contract but could not be decoded.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An action requires an argument that was not supplied.
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// The remote API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{0}")]
    Execution(String),
}

/// A single agent-invokable capability.
///
/// Implementations are host-agnostic: they never see the host handle that
/// controls their visibility. That association lives in the
/// [`DynamicRegistry`](super::registry::DynamicRegistry).
#[async_trait]
pub trait Capability: Send + Sync {
    /// Unique, restart-stable identifier.
    fn name(&self) -> &str;

    /// Description used to tell the model when to use the capability.
    fn description(&self) -> String;

    fn category(&self) -> CapabilityCategory;

    fn annotations(&self) -> CapabilityAnnotations {
        CapabilityAnnotations::default()
    }

    /// Declared default state. `None` is treated as enabled.
    fn default_enabled(&self) -> Option<bool> {
        None
    }

    /// JSON Schema for the arguments. `None` means the capability takes no
    /// parameters.
    fn input_contract(&self) -> Option<Value> {
        None
    }

    /// Run the capability with already-validated input.
    async fn execute(&self, input: Value) -> Result<CapabilityOutput, CapabilityError>;
}

impl fmt::Debug for dyn Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name())
            .field("category", &self.category())
            .field("default_enabled", &self.default_enabled())
            .finish()
    }
}

/// Decode validated input into a typed argument struct.
pub fn parse_input<T: serde::de::DeserializeOwned>(input: Value) -> Result<T, CapabilityError> {
    let input = if input.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        input
    };
    serde_json::from_value(input).map_err(|e| CapabilityError::InvalidInput(e.to_string()))
}

/// Render a schemars type into the JSON Schema value used as an input contract.
pub fn contract_for<T: schemars::JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or(Value::Null)
}
