//! Toolkit configuration.
//!
//! [`ToolkitConfig`] is the declarative surface consumed by the filtering
//! engine. Keys are camelCase so the same document can be shared with other
//! hosts:
//!
//! ```yaml
//! mode: api
//! readOnlyMode: false
//! include: [get_board_items, create_item]
//! enableDynamicApiTools: only
//! enableToolManager: true
//! ```
//!
//! [`ToolkitOptions`] bundles everything the toolkit needs at construction.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::context::ToolkitContext;
use crate::errors::ToolkitError;

/// Environment variable holding the raw API credential.
pub const TOKEN_ENV: &str = "TOOLKIT_API_TOKEN";
/// Environment variable overriding the GraphQL endpoint.
pub const API_URL_ENV: &str = "TOOLKIT_API_URL";
/// Environment variable pinning the API version header.
pub const API_VERSION_ENV: &str = "TOOLKIT_API_VERSION";
/// Environment variable overriding the app-platform base URL.
pub const PLATFORM_URL_ENV: &str = "TOOLKIT_PLATFORM_URL";
/// Environment variable pointing at a YAML [`ToolkitConfig`].
pub const CONFIG_PATH_ENV: &str = "TOOLKIT_CONFIG";

/// Which capability catalogue to expose. The catalogues are mutually
/// exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolkitMode {
    #[default]
    Api,
    Apps,
}

/// `enableDynamicApiTools`: `true`, `false`, or `"only"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DynamicApiTools {
    #[default]
    Enabled,
    Disabled,
    /// Expose nothing but dynamic capabilities.
    Only,
}

impl Serialize for DynamicApiTools {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DynamicApiTools::Enabled => serializer.serialize_bool(true),
            DynamicApiTools::Disabled => serializer.serialize_bool(false),
            DynamicApiTools::Only => serializer.serialize_str("only"),
        }
    }
}

impl<'de> Deserialize<'de> for DynamicApiTools {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Mode(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => Ok(DynamicApiTools::Enabled),
            Raw::Flag(false) => Ok(DynamicApiTools::Disabled),
            Raw::Mode(s) if s == "only" => Ok(DynamicApiTools::Only),
            Raw::Mode(s) => Err(serde::de::Error::custom(format!(
                "enableDynamicApiTools must be true, false or \"only\", got \"{}\"",
                s
            ))),
        }
    }
}

/// Declarative filtering configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolkitConfig {
    pub mode: ToolkitMode,
    /// Keep only READ capabilities.
    pub read_only_mode: bool,
    /// Allow-list of names. When present, `exclude` is not consulted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
    pub enable_dynamic_api_tools: DynamicApiTools,
    /// Register the `manage_capabilities` meta-capability.
    pub enable_tool_manager: bool,
}

impl ToolkitConfig {
    /// Parse a camelCase YAML document.
    pub fn from_yaml(source: &str) -> Result<Self, ToolkitError> {
        serde_yaml::from_str(source).map_err(|e| ToolkitError::Config(e.to_string()))
    }

    /// Read and parse a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ToolkitError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ToolkitError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    /// Builder: select the API or apps catalogue.
    pub fn with_mode(mut self, mode: ToolkitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder: drop WRITE capabilities.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only_mode = read_only;
        self
    }

    /// Builder: keep only these names.
    pub fn with_include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Builder: drop these names. Ignored when an include list is set.
    pub fn with_exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_dynamic_api_tools(mut self, dynamic: DynamicApiTools) -> Self {
        self.enable_dynamic_api_tools = dynamic;
        self
    }

    /// Builder: register `manage_capabilities`.
    pub fn with_tool_manager(mut self, enabled: bool) -> Self {
        self.enable_tool_manager = enabled;
        self
    }
}

/// Construction inputs for a [`Toolkit`](crate::toolkit::Toolkit).
#[derive(Clone, Default)]
pub struct ToolkitOptions {
    /// Raw API credential.
    pub api_token: String,
    pub api_url: Option<String>,
    pub api_version: Option<String>,
    /// Base URL of the app-platform API; the built-in default when `None`.
    pub platform_url: Option<String>,
    pub context: Option<ToolkitContext>,
    /// `None` applies the no-config filtering rules.
    pub config: Option<ToolkitConfig>,
}

impl fmt::Debug for ToolkitOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolkitOptions")
            .field("api_token", &"<masked>")
            .field("api_url", &self.api_url)
            .field("api_version", &self.api_version)
            .field("platform_url", &self.platform_url)
            .field("context", &self.context)
            .field("config", &self.config)
            .finish()
    }
}

impl ToolkitOptions {
    /// Options with only the API token set.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            ..Default::default()
        }
    }

    /// Build options from `TOOLKIT_*` environment variables.
    pub fn from_env() -> Result<Self, ToolkitError> {
        let api_token = std::env::var(TOKEN_ENV)
            .map_err(|_| ToolkitError::Config(format!("{} is not set", TOKEN_ENV)))?;

        let config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => Some(ToolkitConfig::from_file(path)?),
            _ => None,
        };

        Ok(Self {
            api_token,
            api_url: std::env::var(API_URL_ENV).ok(),
            api_version: std::env::var(API_VERSION_ENV).ok(),
            platform_url: std::env::var(PLATFORM_URL_ENV).ok(),
            context: None,
            config,
        })
    }

    pub fn with_config(mut self, config: ToolkitConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_context(mut self, context: ToolkitContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Builder: override the GraphQL endpoint.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Builder: pin the `API-Version` header.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Builder: point app-platform capabilities at `url`.
    pub fn with_platform_url(mut self, url: impl Into<String>) -> Self {
        self.platform_url = Some(url.into());
        self
    }
}
