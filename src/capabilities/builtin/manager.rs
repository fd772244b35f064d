//! `manage_capabilities`: lets the agent inspect and change its own active
//! capability set through the [`DynamicRegistry`].
//!
//! The manager is itself registered in the registry it controls. It keeps
//! the registry alive for as long as the host can still call it; the
//! resulting cycle is broken by [`DynamicRegistry::clear`].

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::capabilities::capability::{contract_for, parse_input};
use crate::capabilities::registry::{CapabilityStatus, DynamicRegistry};
use crate::capabilities::{
    Capability, CapabilityAnnotations, CapabilityCategory, CapabilityError, CapabilityOutput,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
enum ManageAction {
    /// Names with their enabled flag.
    List,
    /// Active and inactive capabilities with descriptions.
    Detailed,
    /// State of one capability, or of all when no name is given.
    Status,
    Enable,
    Disable,
    /// Restore the declared default state.
    Reset,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ManageInput {
    action: ManageAction,
    /// Target capability. Required for enable, disable and reset.
    #[serde(default)]
    tool_name: Option<String>,
}

#[derive(Debug, Default)]
pub struct ManageCapabilities {
    registry: OnceLock<Arc<DynamicRegistry>>,
}

impl ManageCapabilities {
    pub const NAME: &'static str = "manage_capabilities";

    /// Create an unbound manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the registry this manager operates on. Only the first call
    /// has an effect.
    pub fn bind(&self, registry: &Arc<DynamicRegistry>) -> bool {
        self.registry.set(Arc::clone(registry)).is_ok()
    }

    fn registry(&self) -> Result<&Arc<DynamicRegistry>, CapabilityError> {
        self.registry
            .get()
            .ok_or_else(|| CapabilityError::Execution("capability registry is not bound".to_string()))
    }
}

fn state_word(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

fn render_list(statuses: &[CapabilityStatus]) -> String {
    let mut out = format!("Capabilities ({}):", statuses.len());
    for status in statuses {
        out.push_str(&format!("\n- {}: {}", status.name, state_word(status.enabled)));
    }
    out
}

fn activation_instruction(name: &str) -> String {
    json!({ "action": "enable", "toolName": name }).to_string()
}

fn render_detailed(statuses: &[CapabilityStatus]) -> String {
    let (active, inactive): (Vec<_>, Vec<_>) = statuses.iter().partition(|s| s.enabled);

    let mut out = format!("Active capabilities ({}):", active.len());
    for status in &active {
        out.push_str(&format!(
            "\n- {} [{}]: {}",
            status.name, status.category, status.description
        ));
    }
    out.push_str(&format!("\n\nInactive capabilities ({}):", inactive.len()));
    for status in &inactive {
        out.push_str(&format!(
            "\n- {} [{}]: {} To activate, call {} with {}",
            status.name,
            status.category,
            status.description,
            ManageCapabilities::NAME,
            activation_instruction(&status.name)
        ));
    }
    out
}

fn not_found(name: &str) -> String {
    format!("Capability {} not found", name)
}

fn required_name(input: &ManageInput) -> Result<&str, CapabilityError> {
    input
        .tool_name
        .as_deref()
        .ok_or_else(|| CapabilityError::MissingArgument("toolName".to_string()))
}

#[async_trait]
impl Capability for ManageCapabilities {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> String {
        "Inspect and change which capabilities are active. Actions: list, detailed, \
         status, enable, disable, reset. enable, disable and reset need toolName; \
         changes apply from the next capability listing."
            .to_string()
    }

    fn category(&self) -> CapabilityCategory {
        CapabilityCategory::Write
    }

    fn annotations(&self) -> CapabilityAnnotations {
        let mut annotations = CapabilityAnnotations::titled("Manage Capabilities").idempotent();
        annotations.destructive_hint = Some(false);
        annotations
    }

    fn input_contract(&self) -> Option<Value> {
        Some(contract_for::<ManageInput>())
    }

    async fn execute(&self, input: Value) -> Result<CapabilityOutput, CapabilityError> {
        let input: ManageInput = parse_input(input)?;
        let registry = self.registry()?;

        let text = match input.action {
            ManageAction::List => render_list(&registry.detailed_status_all()),
            ManageAction::Detailed => render_detailed(&registry.detailed_status_all()),
            ManageAction::Status => match input.tool_name.as_deref() {
                Some(name) => match registry.status(name) {
                    Some(enabled) => format!("Capability {} is {}", name, state_word(enabled)),
                    None => not_found(name),
                },
                None => render_list(&registry.detailed_status_all()),
            },
            ManageAction::Enable => {
                let name = required_name(&input)?;
                if registry.enable(name) {
                    format!("Capability {} is now enabled", name)
                } else {
                    not_found(name)
                }
            }
            ManageAction::Disable => {
                let name = required_name(&input)?;
                if registry.disable(name) {
                    format!("Capability {} is now disabled", name)
                } else {
                    not_found(name)
                }
            }
            ManageAction::Reset => {
                let name = required_name(&input)?;
                if registry.reset(name) {
                    let enabled = registry.status(name).unwrap_or(false);
                    format!(
                        "Capability {} reset to its default ({})",
                        name,
                        state_word(enabled)
                    )
                } else {
                    not_found(name)
                }
            }
        };
        Ok(CapabilityOutput::text(text))
    }
}
