//! Decides which capabilities exist in this process.
//!
//! Rules, in order:
//! 1. The mode picks one catalogue (`api` or `apps`); the other is ignored.
//! 2. Every candidate is instantiated through the factory.
//! 3. Without a config, everything except DYNAMIC capabilities survives.
//! 4. In `api` mode with `enableDynamicApiTools: only`, exactly the DYNAMIC
//!    capabilities survive and no other rule is applied.
//! 5. Otherwise a capability is dropped if any of these hold:
//!    - `api` mode, `enableDynamicApiTools: false`, and it is DYNAMIC
//!    - `readOnlyMode` is set and it is not READ
//!    - an `include` list is present and does not name it
//!    - no `include` list, an `exclude` list is present and names it
//!
//! When `include` is present, `exclude` is never consulted.

use std::collections::HashSet;

use super::capability::CapabilityCategory;
use super::catalogue::Catalogue;
use super::factory::{create, CapabilityInstance, DependencyBundle};
use crate::config::{DynamicApiTools, ToolkitConfig, ToolkitMode};

/// Name-list part of the rules, built once per selection.
struct NameFilter {
    include: Option<HashSet<String>>,
    exclude: HashSet<String>,
}

impl NameFilter {
    fn new(config: &ToolkitConfig) -> Self {
        Self {
            include: config.include.as_ref().map(|names| names.iter().cloned().collect()),
            exclude: config
                .exclude
                .as_ref()
                .map(|names| names.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }

    fn excludes(&self, name: &str) -> bool {
        match &self.include {
            Some(include) => !include.contains(name),
            None => self.exclude.contains(name),
        }
    }
}

fn is_excluded(instance: &CapabilityInstance, config: &ToolkitConfig, names: &NameFilter) -> bool {
    let category = instance.capability.category();

    let dynamic_disabled = config.mode == ToolkitMode::Api
        && config.enable_dynamic_api_tools == DynamicApiTools::Disabled
        && category == CapabilityCategory::Dynamic;
    let not_read_only = config.read_only_mode && category != CapabilityCategory::Read;

    dynamic_disabled || not_read_only || names.excludes(instance.name())
}

/// Instantiate and filter the catalogue for this process.
pub fn select(
    catalogue: &Catalogue,
    config: Option<&ToolkitConfig>,
    bundle: &DependencyBundle,
) -> Vec<CapabilityInstance> {
    let mode = config.map(|c| c.mode).unwrap_or_default();
    let candidates: Vec<CapabilityInstance> = catalogue
        .for_mode(mode)
        .iter()
        .map(|ctor| create(ctor, bundle))
        .collect();
    let total = candidates.len();

    let selected: Vec<CapabilityInstance> = match config {
        None => candidates
            .into_iter()
            .filter(|i| i.capability.category() != CapabilityCategory::Dynamic)
            .collect(),
        Some(config)
            if config.mode == ToolkitMode::Api
                && config.enable_dynamic_api_tools == DynamicApiTools::Only =>
        {
            candidates
                .into_iter()
                .filter(|i| i.capability.category() == CapabilityCategory::Dynamic)
                .collect()
        }
        Some(config) => {
            let names = NameFilter::new(config);
            candidates
                .into_iter()
                .filter(|i| !is_excluded(i, config, &names))
                .collect()
        }
    };

    log::info!(
        "Selected {} of {} capabilities ({:?} mode)",
        selected.len(),
        total,
        mode
    );
    selected
}
