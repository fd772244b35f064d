//! Host integration contract.
//!
//! The host lists capabilities to the agent and dispatches calls into them.
//! The toolkit only needs two primitives from it:
//!
//! 1. `register_capability(name, registration, handler) -> HostHandle`
//! 2. `HostHandle::enable()` / `HostHandle::disable()` to toggle visibility
//!
//! Visibility changes take effect on the next listing the host performs.

pub mod memory;

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::capabilities::CapabilityAnnotations;

pub use memory::InMemoryHost;

/// One content block of a host result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HostContent {
    Text { text: String },
}

/// Structured result handed back to the host for every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostResult {
    pub content: Vec<HostContent>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl HostResult {
    /// Successful result with one text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![HostContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Error result with one text block.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![HostContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// Concatenated text of every content block.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                HostContent::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Metadata registered alongside a handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityRegistration {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_contract: Option<Value>,
    pub annotations: CapabilityAnnotations,
}

/// Host-facing entry point of a wrapped capability. Never fails.
pub type HostHandler = Arc<dyn Fn(Value) -> BoxFuture<'static, HostResult> + Send + Sync>;

/// Visibility control the host returns for each registration.
///
/// Calls are synchronous and non-throwing by contract.
pub trait HostHandle: Send + Sync {
    fn enable(&self);
    fn disable(&self);
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("capability {0} is already registered")]
    DuplicateName(String),

    #[error("host rejected capability {name}: {reason}")]
    Rejected { name: String, reason: String },
}

/// The external runtime capabilities are registered with.
///
/// Every registration starts visible.
pub trait CapabilityHost: Send + Sync {
    fn register_capability(
        &self,
        name: &str,
        registration: CapabilityRegistration,
        handler: HostHandler,
    ) -> Result<Arc<dyn HostHandle>, HostError>;
}
