//! App-platform management capabilities.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::PlatformClient;
use crate::capabilities::capability::{contract_for, parse_input};
use crate::capabilities::{
    Capability, CapabilityAnnotations, CapabilityCategory, CapabilityError, CapabilityOutput,
};

pub struct ListApps {
    client: PlatformClient,
}

impl ListApps {
    pub const NAME: &'static str = "list_apps";

    pub fn new(client: PlatformClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Capability for ListApps {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> String {
        "List the apps owned by the current account.".to_string()
    }

    fn category(&self) -> CapabilityCategory {
        CapabilityCategory::Read
    }

    fn annotations(&self) -> CapabilityAnnotations {
        CapabilityAnnotations::titled("List Apps").read_only().idempotent()
    }

    async fn execute(&self, _input: Value) -> Result<CapabilityOutput, CapabilityError> {
        let apps = self.client.get("apps").await?;
        Ok(CapabilityOutput::text(apps.to_string()).with_metadata(apps))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct CreateAppInput {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

pub struct CreateApp {
    client: PlatformClient,
}

impl CreateApp {
    pub const NAME: &'static str = "create_app";

    pub fn new(client: PlatformClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Capability for CreateApp {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> String {
        "Create a new app with a name and optional description.".to_string()
    }

    fn category(&self) -> CapabilityCategory {
        CapabilityCategory::Write
    }

    fn annotations(&self) -> CapabilityAnnotations {
        CapabilityAnnotations::titled("Create App")
    }

    fn input_contract(&self) -> Option<Value> {
        Some(contract_for::<CreateAppInput>())
    }

    async fn execute(&self, input: Value) -> Result<CapabilityOutput, CapabilityError> {
        let input: CreateAppInput = parse_input(input)?;
        let mut body = json!({ "name": input.name });
        if let Some(description) = input.description {
            body["description"] = Value::String(description);
        }

        let app = self.client.post("apps", &body).await?;
        let id = match &app["id"] {
            Value::String(id) => id.clone(),
            other => other.to_string(),
        };
        Ok(CapabilityOutput::text(format!("App {} created with id {}", input.name, id))
            .with_metadata(app))
    }
}
