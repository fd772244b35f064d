//! Builds capability instances with the dependency shape of their family.
//!
//! Each constructor belongs to exactly one [`CapabilityFamily`]. The family is
//! fixed when the constructor is declared, so dispatch is an exhaustive match
//! rather than a runtime type check:
//!
//! | Family      | Receives                          |
//! |-------------|-----------------------------------|
//! | `RemoteApi` | API client, raw token, context    |
//! | `Platform`  | raw token                         |
//! | `Utility`   | nothing                           |

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::capability::Capability;
use crate::api::ApiClient;
use crate::context::ToolkitContext;

/// Which dependency shape a capability is constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityFamily {
    /// Wraps the GraphQL API.
    RemoteApi,
    /// Wraps the app-platform management API.
    Platform,
    /// Needs no remote surface (e.g. the capability manager).
    Utility,
}

impl CapabilityFamily {
    /// Tag attached to telemetry events.
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityFamily::RemoteApi => "api",
            CapabilityFamily::Platform => "platform",
            CapabilityFamily::Utility => "utility",
        }
    }
}

/// Shared, read-only dependencies built once per toolkit.
#[derive(Clone)]
pub struct DependencyBundle {
    pub api_client: Arc<dyn ApiClient>,
    pub api_token: String,
    pub context: Option<ToolkitContext>,
}

impl fmt::Debug for DependencyBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyBundle")
            .field("api_token", &"<masked>")
            .field("context", &self.context)
            .finish()
    }
}

pub type RemoteApiCtor =
    Arc<dyn Fn(Arc<dyn ApiClient>, String, Option<ToolkitContext>) -> Arc<dyn Capability> + Send + Sync>;
pub type PlatformCtor = Arc<dyn Fn(String) -> Arc<dyn Capability> + Send + Sync>;
pub type UtilityCtor = Arc<dyn Fn() -> Arc<dyn Capability> + Send + Sync>;

/// A capability constructor tagged with its family.
#[derive(Clone)]
pub enum CapabilityConstructor {
    RemoteApi(RemoteApiCtor),
    Platform(PlatformCtor),
    Utility(UtilityCtor),
}

impl fmt::Debug for CapabilityConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapabilityConstructor({})", self.family().as_str())
    }
}

impl CapabilityConstructor {
    /// Constructor for a capability over the GraphQL API client.
    pub fn remote_api<F>(ctor: F) -> Self
    where
        F: Fn(Arc<dyn ApiClient>, String, Option<ToolkitContext>) -> Arc<dyn Capability>
            + Send
            + Sync
            + 'static,
    {
        CapabilityConstructor::RemoteApi(Arc::new(ctor))
    }

    /// Constructor for a capability built from the raw token.
    pub fn platform<F>(ctor: F) -> Self
    where
        F: Fn(String) -> Arc<dyn Capability> + Send + Sync + 'static,
    {
        CapabilityConstructor::Platform(Arc::new(ctor))
    }

    /// Constructor for a capability with no dependencies.
    pub fn utility<F>(ctor: F) -> Self
    where
        F: Fn() -> Arc<dyn Capability> + Send + Sync + 'static,
    {
        CapabilityConstructor::Utility(Arc::new(ctor))
    }

    pub fn family(&self) -> CapabilityFamily {
        match self {
            CapabilityConstructor::RemoteApi(_) => CapabilityFamily::RemoteApi,
            CapabilityConstructor::Platform(_) => CapabilityFamily::Platform,
            CapabilityConstructor::Utility(_) => CapabilityFamily::Utility,
        }
    }
}

/// A constructed capability together with its resolved family.
#[derive(Clone)]
pub struct CapabilityInstance {
    pub capability: Arc<dyn Capability>,
    pub family: CapabilityFamily,
}

impl fmt::Debug for CapabilityInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityInstance")
            .field("name", &self.capability.name())
            .field("category", &self.capability.category())
            .field("family", &self.family)
            .finish()
    }
}

impl CapabilityInstance {
    pub fn name(&self) -> &str {
        self.capability.name()
    }
}

/// Instantiate `ctor` with the dependency shape its family requires.
pub fn create(ctor: &CapabilityConstructor, bundle: &DependencyBundle) -> CapabilityInstance {
    let capability = match ctor {
        CapabilityConstructor::RemoteApi(make) => make(
            Arc::clone(&bundle.api_client),
            bundle.api_token.clone(),
            bundle.context.clone(),
        ),
        CapabilityConstructor::Platform(make) => make(bundle.api_token.clone()),
        CapabilityConstructor::Utility(make) => make(),
    };
    CapabilityInstance {
        capability,
        family: ctor.family(),
    }
}
