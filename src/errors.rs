//! Toolkit-level error types.

use thiserror::Error;

/// Boxed source error carried by initialization failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the toolkit core.
#[derive(Debug, Error)]
pub enum ToolkitError {
    /// Raw arguments failed the capability's input contract.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A capability body failed.
    #[error("Failed to execute capability {name}: {message}")]
    Execution { name: String, message: String },

    /// A construction step of the toolkit failed.
    #[error("Failed to initialize toolkit ({step}): {source}")]
    Initialization {
        step: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown capability: {0}")]
    UnknownCapability(String),
}

impl ToolkitError {
    /// Wrap a failure of construction step `step`.
    pub fn initialization(step: &'static str, source: impl Into<BoxError>) -> Self {
        ToolkitError::Initialization {
            step,
            source: source.into(),
        }
    }
}
