//! DYNAMIC capabilities: compose arbitrary GraphQL operations.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{ApiClient, SchemaCache};
use crate::capabilities::capability::{contract_for, parse_input};
use crate::capabilities::{
    Capability, CapabilityAnnotations, CapabilityCategory, CapabilityError, CapabilityOutput,
};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct AllApiInput {
    /// GraphQL query or mutation document.
    query: String,
    /// Variables for the document, as a JSON object.
    #[serde(default)]
    variables: Option<Value>,
}

/// Runs any GraphQL document against the API.
pub struct AllApi {
    client: Arc<dyn ApiClient>,
}

impl AllApi {
    pub const NAME: &'static str = "all_api";

    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Capability for AllApi {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> String {
        "Execute any GraphQL query or mutation against the API. Use get_graphql_schema \
         first to discover the available types and fields."
            .to_string()
    }

    fn category(&self) -> CapabilityCategory {
        CapabilityCategory::Dynamic
    }

    fn annotations(&self) -> CapabilityAnnotations {
        let mut annotations = CapabilityAnnotations::titled("Run GraphQL");
        annotations.open_world_hint = Some(true);
        annotations
    }

    fn input_contract(&self) -> Option<Value> {
        Some(contract_for::<AllApiInput>())
    }

    async fn execute(&self, input: Value) -> Result<CapabilityOutput, CapabilityError> {
        let input: AllApiInput = parse_input(input)?;
        let data = self.client.request(&input.query, input.variables).await?;
        Ok(CapabilityOutput::text(data.to_string()).with_metadata(data))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct SchemaInput {
    /// Return the full definition of this type instead of the root summary.
    #[serde(default)]
    type_name: Option<String>,
}

/// Describes the remote schema, backed by an injected [`SchemaCache`].
pub struct GetGraphQlSchema {
    client: Arc<dyn ApiClient>,
    cache: Arc<dyn SchemaCache>,
}

impl GetGraphQlSchema {
    pub const NAME: &'static str = "get_graphql_schema";

    /// Share `cache` with every other schema capability of the toolkit.
    pub fn new(client: Arc<dyn ApiClient>, cache: Arc<dyn SchemaCache>) -> Self {
        Self { client, cache }
    }
}

fn root_field_names(schema: &Value, root: &str) -> Vec<String> {
    let Some(root_name) = schema["__schema"][root]["name"].as_str() else {
        return Vec::new();
    };
    find_type(schema, root_name)
        .and_then(|t| t["fields"].as_array())
        .map(|fields| {
            fields
                .iter()
                .filter_map(|f| f["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

fn find_type<'a>(schema: &'a Value, name: &str) -> Option<&'a Value> {
    schema["__schema"]["types"]
        .as_array()?
        .iter()
        .find(|t| t["name"].as_str() == Some(name))
}

#[async_trait]
impl Capability for GetGraphQlSchema {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> String {
        "Describe the GraphQL schema: root queries and mutations, or the full \
         definition of one type when typeName is given."
            .to_string()
    }

    fn category(&self) -> CapabilityCategory {
        CapabilityCategory::Dynamic
    }

    fn annotations(&self) -> CapabilityAnnotations {
        CapabilityAnnotations::titled("Get GraphQL Schema")
            .read_only()
            .idempotent()
    }

    fn input_contract(&self) -> Option<Value> {
        Some(contract_for::<SchemaInput>())
    }

    async fn execute(&self, input: Value) -> Result<CapabilityOutput, CapabilityError> {
        let input: SchemaInput = parse_input(input)?;
        let schema = self.cache.get(self.client.as_ref()).await?;

        let body = match input.type_name {
            Some(type_name) => find_type(&schema, &type_name).cloned().ok_or_else(|| {
                CapabilityError::Execution(format!("Type {} not found in schema", type_name))
            })?,
            None => json!({
                "queries": root_field_names(&schema, "queryType"),
                "mutations": root_field_names(&schema, "mutationType"),
            }),
        };
        Ok(CapabilityOutput::text(body.to_string()))
    }
}
