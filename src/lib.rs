//! # Agent Toolkit
//!
//! Capability lifecycle for agent hosts: decide from configuration which
//! capabilities exist, register each with the host under one execution
//! contract (validation, timing, error formatting, telemetry), and let the
//! agent change its own active set at runtime.
//!
//! ```no_run
//! use agent_toolkit::{InMemoryHost, Toolkit, ToolkitConfig, ToolkitOptions};
//!
//! # fn main() -> Result<(), agent_toolkit::ToolkitError> {
//! let host = InMemoryHost::new();
//! let options = ToolkitOptions::new("api-token")
//!     .with_config(ToolkitConfig::default().with_read_only(true).with_tool_manager(true));
//! let toolkit = Toolkit::new(options, &host)?;
//! println!("{:?}", toolkit.status_all());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod capabilities;
pub mod config;
pub mod context;
pub mod credentials;
pub mod errors;
pub mod host;
pub mod telemetry;
pub mod toolkit;

#[cfg(test)]
mod testing;

pub use capabilities::{
    Capability, CapabilityAnnotations, CapabilityCategory, CapabilityConstructor,
    CapabilityError, CapabilityFamily, CapabilityOutput, CapabilityStatus, Catalogue,
    DynamicRegistry,
};
pub use config::{DynamicApiTools, ToolkitConfig, ToolkitMode, ToolkitOptions};
pub use context::ToolkitContext;
pub use errors::ToolkitError;
pub use host::{CapabilityHost, HostHandle, HostResult, InMemoryHost};
pub use telemetry::{Telemetry, TelemetrySink};
pub use toolkit::{ToolDefinition, Toolkit, ToolkitBuilder};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
