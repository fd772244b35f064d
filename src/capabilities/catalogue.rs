//! The full set of known capability constructors, split by mode.

use super::builtin;
use super::factory::CapabilityConstructor;
use crate::api::platform::DEFAULT_PLATFORM_URL;
use crate::config::ToolkitMode;

/// Every capability the toolkit knows how to build.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    /// Capabilities over the GraphQL API (`mode: api`).
    pub api: Vec<CapabilityConstructor>,
    /// App-platform management capabilities (`mode: apps`).
    pub apps: Vec<CapabilityConstructor>,
}

impl Catalogue {
    /// Create an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalogue shipped with the toolkit.
    pub fn builtin() -> Self {
        Self::builtin_with_platform_url(DEFAULT_PLATFORM_URL)
    }

    /// The shipped catalogue, with app-platform capabilities pointed at
    /// `platform_url`.
    pub fn builtin_with_platform_url(platform_url: &str) -> Self {
        Self {
            api: builtin::api_capabilities(),
            apps: builtin::apps_capabilities(platform_url),
        }
    }

    /// Constructors for `mode`.
    pub fn for_mode(&self, mode: ToolkitMode) -> &[CapabilityConstructor] {
        match mode {
            ToolkitMode::Api => &self.api,
            ToolkitMode::Apps => &self.apps,
        }
    }

    /// Append an API-mode constructor.
    pub fn with_api(mut self, ctor: CapabilityConstructor) -> Self {
        self.api.push(ctor);
        self
    }

    /// Append an apps-mode constructor.
    pub fn with_apps(mut self, ctor: CapabilityConstructor) -> Self {
        self.apps.push(ctor);
        self
    }
}
