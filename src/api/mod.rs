//! Remote API clients used by the capability families.
//!
//! - [`ApiClient`] is the GraphQL surface handed to remote-API capabilities.
//! - [`PlatformClient`] is the REST surface used by platform-management
//!   capabilities, built from the credential alone.
//! - [`schema_cache`] holds the injected introspection cache.

pub mod platform;
pub mod schema_cache;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

pub use platform::PlatformClient;
pub use schema_cache::{SchemaCache, TtlSchemaCache};

/// Default GraphQL endpoint.
pub const DEFAULT_API_URL: &str = "https://api.monday.com/v2";

/// Remote API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GraphQL errors: {0}")]
    GraphQl(String),

    #[error("Failed to decode API response: {0}")]
    Decode(String),
}

/// Handle to the wrapped GraphQL API.
///
/// Shared read-only by every remote-API capability for the lifetime of the
/// toolkit.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Run one GraphQL document and return its `data` payload.
    async fn request(&self, query: &str, variables: Option<Value>) -> Result<Value, ApiError>;
}

/// `reqwest`-backed GraphQL client.
#[derive(Clone)]
pub struct GraphQlApiClient {
    http: reqwest::Client,
    url: String,
    token: String,
    api_version: Option<String>,
}

impl std::fmt::Debug for GraphQlApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQlApiClient")
            .field("url", &self.url)
            .field("token", &"<masked>")
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl GraphQlApiClient {
    /// Client against [`DEFAULT_API_URL`] with no pinned version.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            api_version: None,
        }
    }

    /// Builder: override the endpoint URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Builder: pin the `API-Version` header.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ApiClient for GraphQlApiClient {
    async fn request(&self, query: &str, variables: Option<Value>) -> Result<Value, ApiError> {
        let mut body = json!({ "query": query });
        if let Some(vars) = variables {
            body["variables"] = vars;
        }

        let mut request = self
            .http
            .post(&self.url)
            .header("Authorization", &self.token)
            .json(&body);
        if let Some(version) = &self.api_version {
            request = request.header("API-Version", version);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        extract_data(payload)
    }
}

/// Pull `data` out of a GraphQL response envelope, surfacing `errors`.
pub fn extract_data(mut payload: Value) -> Result<Value, ApiError> {
    if let Some(errors) = payload.get("errors").and_then(|e| e.as_array()) {
        if !errors.is_empty() {
            let messages: Vec<String> = errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(|m| m.as_str())
                        .map(String::from)
                        .unwrap_or_else(|| e.to_string())
                })
                .collect();
            return Err(ApiError::GraphQl(messages.join("; ")));
        }
    }

    match payload.get_mut("data") {
        Some(data) => Ok(data.take()),
        None => Err(ApiError::Decode("response has no `data` field".to_string())),
    }
}
