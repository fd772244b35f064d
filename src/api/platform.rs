//! REST client for the app-platform management surface.
//!
//! Platform-management capabilities are constructed from the raw credential
//! only, so this client carries its own transport. The base URL is fixed when
//! the catalogue is built and never read from the environment here.

use serde_json::Value;

use super::ApiError;

/// Default base URL of the app-platform REST API.
pub const DEFAULT_PLATFORM_URL: &str = "https://api.monday.com/apps_ms/api";

#[derive(Clone)]
pub struct PlatformClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for PlatformClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformClient")
            .field("base_url", &self.base_url)
            .field("token", &"<masked>")
            .finish()
    }
}

impl PlatformClient {
    /// Create a client against [`DEFAULT_PLATFORM_URL`].
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_PLATFORM_URL.to_string(),
            token: token.into(),
        }
    }

    /// Builder: override the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        let response = self
            .http
            .get(self.endpoint(path))
            .header("Authorization", &self.token)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let response = self
            .http
            .post(self.endpoint(path))
            .header("Authorization", &self.token)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}
