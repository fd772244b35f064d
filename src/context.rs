//! Operational and agent-identity context shared by remote-API capabilities.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Context record passed to every remote-API capability and attached to
/// telemetry events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolkitContext {
    /// Board the agent is operating on, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    /// Kind of agent driving the toolkit (e.g. "assistant", "workflow").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    /// Name of the client application hosting the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_client_name: Option<String>,
    /// Free-form extra fields, forwarded to telemetry as-is.
    #[serde(default, flatten)]
    pub extra: HashMap<String, Value>,
}

impl ToolkitContext {
    /// Empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: default board for item capabilities.
    pub fn with_board_id(mut self, board_id: impl Into<String>) -> Self {
        self.board_id = Some(board_id.into());
        self
    }

    /// Builder: agent type and client name reported in telemetry.
    pub fn with_agent(mut self, agent_type: impl Into<String>, client_name: impl Into<String>) -> Self {
        self.agent_type = Some(agent_type.into());
        self.agent_client_name = Some(client_name.into());
        self
    }

    /// Flatten the context into telemetry fields (camelCase keys).
    pub fn telemetry_fields(&self) -> HashMap<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.into_iter().collect(),
            _ => HashMap::new(),
        }
    }
}
