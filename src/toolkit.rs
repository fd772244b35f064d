//! Toolkit facade: the composition root.
//!
//! Construction builds the dependency bundle, filters the catalogue, wraps and
//! registers every survivor with the host, and feeds the returned handles into
//! the [`DynamicRegistry`]. The capability manager is only added when the
//! configuration asks for it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::api::platform::DEFAULT_PLATFORM_URL;
use crate::api::{ApiClient, GraphQlApiClient, DEFAULT_API_URL};
use crate::capabilities::{
    create, invocation_tags, select, Capability, CapabilityAnnotations, CapabilityConstructor,
    CapabilityExecutor, CapabilityInstance, CapabilityOutput, CapabilityStatus, Catalogue,
    DependencyBundle, DynamicRegistry, ManageCapabilities,
};
use crate::config::ToolkitOptions;
use crate::errors::ToolkitError;
use crate::host::{CapabilityHost, HostError, HostHandler};
use crate::telemetry::Telemetry;

/// A registered capability as seen by callers that bypass the host.
#[derive(Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_contract: Option<Value>,
    pub annotations: CapabilityAnnotations,
    pub handler: HostHandler,
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_contract", &self.input_contract)
            .field("annotations", &self.annotations)
            .finish()
    }
}

/// Builder for [`Toolkit`] with overridable collaborators.
pub struct ToolkitBuilder {
    options: ToolkitOptions,
    catalogue: Option<Catalogue>,
    telemetry: Option<Telemetry>,
    api_client: Option<Arc<dyn ApiClient>>,
}

impl fmt::Debug for ToolkitBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolkitBuilder")
            .field("options", &self.options)
            .field("custom_catalogue", &self.catalogue.is_some())
            .field("custom_api_client", &self.api_client.is_some())
            .finish()
    }
}

impl ToolkitBuilder {
    /// Start a builder over `options`.
    pub fn new(options: ToolkitOptions) -> Self {
        Self {
            options,
            catalogue: None,
            telemetry: None,
            api_client: None,
        }
    }

    /// Replace the built-in catalogue.
    pub fn with_catalogue(mut self, catalogue: Catalogue) -> Self {
        self.catalogue = Some(catalogue);
        self
    }

    /// Builder: replace the telemetry handle built from the environment.
    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Use `client` instead of a GraphQL client built from the options.
    pub fn with_api_client(mut self, client: Arc<dyn ApiClient>) -> Self {
        self.api_client = Some(client);
        self
    }

    fn api_client(&self) -> Result<Arc<dyn ApiClient>, ToolkitError> {
        if let Some(client) = &self.api_client {
            return Ok(Arc::clone(client));
        }
        let url = self.options.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
        reqwest::Url::parse(url).map_err(|e| ToolkitError::initialization("api client", e))?;

        let mut client = GraphQlApiClient::new(self.options.api_token.clone()).with_url(url);
        if let Some(version) = &self.options.api_version {
            client = client.with_api_version(version.clone());
        }
        Ok(Arc::new(client))
    }

    /// Build the toolkit and register its capabilities with `host`.
    pub fn build(self, host: &dyn CapabilityHost) -> Result<Toolkit, ToolkitError> {
        let bundle = DependencyBundle {
            api_client: self.api_client()?,
            api_token: self.options.api_token.clone(),
            context: self.options.context.clone(),
        };
        let catalogue = match self.catalogue {
            Some(catalogue) => catalogue,
            None => Catalogue::builtin_with_platform_url(
                self.options
                    .platform_url
                    .as_deref()
                    .unwrap_or(DEFAULT_PLATFORM_URL),
            ),
        };
        let telemetry = self.telemetry.unwrap_or_default();
        let tags = Arc::new(invocation_tags(
            bundle.context.as_ref(),
            &bundle.api_token,
        ));
        let config = self.options.config.as_ref();

        let mut toolkit = Toolkit {
            registry: Arc::new(DynamicRegistry::new()),
            executors: Vec::new(),
        };

        for instance in select(&catalogue, config, &bundle) {
            toolkit.register(host, instance, &telemetry, &tags)?;
        }

        if config.map_or(false, |c| c.enable_tool_manager) {
            let manager = Arc::new(ManageCapabilities::new());
            manager.bind(&toolkit.registry);
            let ctor = CapabilityConstructor::utility(move || {
                Arc::clone(&manager) as Arc<dyn Capability>
            });
            let instance = create(&ctor, &bundle);
            toolkit.register(host, instance, &telemetry, &tags)?;
        }

        log::info!(
            "Toolkit ready with {} capabilities",
            toolkit.registry.len()
        );
        Ok(toolkit)
    }
}

/// Registered capabilities and their runtime state.
pub struct Toolkit {
    registry: Arc<DynamicRegistry>,
    executors: Vec<Arc<CapabilityExecutor>>,
}

impl fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolkit")
            .field("registry", &self.registry)
            .finish()
    }
}

impl Toolkit {
    /// Build with the built-in catalogue and default telemetry.
    pub fn new(options: ToolkitOptions, host: &dyn CapabilityHost) -> Result<Self, ToolkitError> {
        ToolkitBuilder::new(options).build(host)
    }

    /// Builder for a toolkit with a custom catalogue, telemetry or API client.
    pub fn builder(options: ToolkitOptions) -> ToolkitBuilder {
        ToolkitBuilder::new(options)
    }

    fn register(
        &mut self,
        host: &dyn CapabilityHost,
        instance: CapabilityInstance,
        telemetry: &Telemetry,
        tags: &Arc<serde_json::Map<String, Value>>,
    ) -> Result<(), ToolkitError> {
        if self.registry.contains(instance.name()) {
            return Err(ToolkitError::initialization(
                "host registration",
                HostError::DuplicateName(instance.name().to_string()),
            ));
        }

        let executor = CapabilityExecutor::new(instance.clone(), telemetry.clone(), Arc::clone(tags))
            .map(Arc::new)
            .map_err(|e| ToolkitError::initialization("capability wrapper", e))?;

        let handle = host
            .register_capability(
                executor.name(),
                executor.registration(),
                executor.host_handler(),
            )
            .map_err(|e| ToolkitError::initialization("host registration", e))?;

        self.registry.register(instance, handle);
        self.executors.push(executor);
        Ok(())
    }

    fn executor(&self, name: &str) -> Option<&Arc<CapabilityExecutor>> {
        self.executors.iter().find(|e| e.name() == name)
    }

    /// The registry shared with the host handles and the manager.
    pub fn registry(&self) -> &Arc<DynamicRegistry> {
        &self.registry
    }

    /// Show `name` in the host. `false` if it was never registered.
    pub fn enable(&self, name: &str) -> bool {
        self.registry.enable(name)
    }

    /// Hide `name` from the host. `false` if it was never registered.
    pub fn disable(&self, name: &str) -> bool {
        self.registry.disable(name)
    }

    /// Restore the declared default of `name`.
    pub fn reset(&self, name: &str) -> bool {
        self.registry.reset(name)
    }

    /// Enabled flag of `name`, `None` if it was filtered out or is unknown.
    pub fn status(&self, name: &str) -> Option<bool> {
        self.registry.status(name)
    }

    pub fn status_all(&self) -> HashMap<String, bool> {
        self.registry.status_all()
    }

    /// Name, category, description and flags of every registered capability.
    pub fn detailed_status(&self) -> Vec<CapabilityStatus> {
        self.registry.detailed_status_all()
    }

    /// Registered names, in registration order.
    pub fn list_names(&self) -> Vec<String> {
        self.registry.list_names()
    }

    /// Every registered capability with its host handler, enabled or not.
    pub fn tools(&self) -> Vec<ToolDefinition> {
        self.executors
            .iter()
            .map(|executor| {
                let registration = executor.registration();
                ToolDefinition {
                    name: executor.name().to_string(),
                    description: registration.description,
                    input_contract: registration.input_contract,
                    annotations: registration.annotations,
                    handler: executor.host_handler(),
                }
            })
            .collect()
    }

    /// Run a capability directly, returning failures instead of formatting
    /// them. Visibility is not checked.
    pub async fn execute(&self, name: &str, args: Value) -> Result<CapabilityOutput, ToolkitError> {
        let executor = self
            .executor(name)
            .ok_or_else(|| ToolkitError::UnknownCapability(name.to_string()))?;
        executor.execute(args).await
    }
}
