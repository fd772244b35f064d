//! Runtime enabled/disabled state of every registered capability.
//!
//! One entry per capability that survived filtering, created once at toolkit
//! construction in filtering order. Each entry keeps the host handle that
//! controls the capability's visibility, so the capability itself stays
//! host-agnostic.
//!
//! Invariants:
//! - `enabled` always matches the host's visibility: every state change calls
//!   the handle before the flag is updated.
//! - `enabled_by_default` is captured at registration and never changes;
//!   `reset` restores exactly that value.
//!
//! Mutations for the same name are serialized by the registry lock, so
//! concurrent toggles cannot leave the flag and the host out of step.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use super::capability::CapabilityCategory;
use super::factory::CapabilityInstance;
use crate::host::HostHandle;

struct RegistryEntry {
    instance: CapabilityInstance,
    host_handle: Arc<dyn HostHandle>,
    enabled: bool,
    enabled_by_default: bool,
}

impl RegistryEntry {
    fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        if enabled {
            self.host_handle.enable();
        } else {
            self.host_handle.disable();
        }
        self.enabled = enabled;
        log::debug!(
            "Capability {} {}",
            self.instance.name(),
            if enabled { "enabled" } else { "disabled" }
        );
    }
}

/// Per-capability status including its declared default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityStatus {
    pub name: String,
    pub description: String,
    pub category: CapabilityCategory,
    pub enabled: bool,
    pub enabled_by_default: bool,
}

#[derive(Default)]
struct RegistryState {
    entries: HashMap<String, RegistryEntry>,
    order: Vec<String>,
}

/// Process-lifetime table of capability states.
#[derive(Default)]
pub struct DynamicRegistry {
    state: RwLock<RegistryState>,
}

impl std::fmt::Debug for DynamicRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicRegistry")
            .field("capabilities", &self.list_names())
            .finish()
    }
}

impl DynamicRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly registered capability.
    ///
    /// The host shows every registration by default, so a capability declared
    /// disabled is hidden immediately. Returns `false` (and changes nothing)
    /// if the name is already tracked.
    pub fn register(&self, instance: CapabilityInstance, host_handle: Arc<dyn HostHandle>) -> bool {
        let name = instance.name().to_string();
        let enabled_by_default = instance.capability.default_enabled().unwrap_or(true);

        let mut state = self.state.write();
        if state.entries.contains_key(&name) {
            log::warn!("Capability {} is already registered; ignoring duplicate", name);
            return false;
        }

        if !enabled_by_default {
            host_handle.disable();
        }
        log::debug!(
            "Registered capability {} ({}, {})",
            name,
            instance.capability.category(),
            if enabled_by_default { "enabled" } else { "disabled" }
        );

        state.order.push(name.clone());
        state.entries.insert(
            name,
            RegistryEntry {
                instance,
                host_handle,
                enabled: enabled_by_default,
                enabled_by_default,
            },
        );
        true
    }

    fn transition<F>(&self, name: &str, target: F) -> bool
    where
        F: FnOnce(&RegistryEntry) -> bool,
    {
        let mut state = self.state.write();
        match state.entries.get_mut(name) {
            Some(entry) => {
                let enabled = target(entry);
                entry.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    /// Show a capability. `false` only if the name is unknown.
    pub fn enable(&self, name: &str) -> bool {
        self.transition(name, |_| true)
    }

    /// Hide a capability. `false` only if the name is unknown.
    pub fn disable(&self, name: &str) -> bool {
        self.transition(name, |_| false)
    }

    /// Restore the declared default state. `false` only if the name is unknown.
    pub fn reset(&self, name: &str) -> bool {
        self.transition(name, |entry| entry.enabled_by_default)
    }

    /// Current enabled flag, `None` for unknown names.
    pub fn status(&self, name: &str) -> Option<bool> {
        self.state.read().entries.get(name).map(|e| e.enabled)
    }

    /// Enabled flag of every registered capability.
    pub fn status_all(&self) -> HashMap<String, bool> {
        self.state
            .read()
            .entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.enabled))
            .collect()
    }

    /// Full status of every capability, in registration order.
    pub fn detailed_status_all(&self) -> Vec<CapabilityStatus> {
        let state = self.state.read();
        state
            .order
            .iter()
            .filter_map(|name| state.entries.get(name))
            .map(|entry| CapabilityStatus {
                name: entry.instance.name().to_string(),
                description: entry.instance.capability.description(),
                category: entry.instance.capability.category(),
                enabled: entry.enabled,
                enabled_by_default: entry.enabled_by_default,
            })
            .collect()
    }

    /// Registered names, in registration order.
    pub fn list_names(&self) -> Vec<String> {
        self.state.read().order.clone()
    }

    /// Whether `name` is tracked.
    pub fn contains(&self, name: &str) -> bool {
        self.state.read().entries.contains_key(name)
    }

    /// Number of tracked capabilities.
    pub fn len(&self) -> usize {
        self.state.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry without touching the host handles.
    ///
    /// Only meant for teardown, when the host is discarded at the same time.
    /// Also releases the registry held by a bound `manage_capabilities`, which
    /// otherwise keeps this registry alive through its own entry.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.entries.clear();
        state.order.clear();
    }
}
