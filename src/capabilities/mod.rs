//! # Capabilities
//!
//! Everything between "which capabilities exist" and "what happens when one
//! is invoked".
//!
//! ## Lifecycle
//!
//! 1. [`Catalogue`] lists every known constructor, split by mode.
//! 2. [`select`] instantiates the catalogue for the configured mode through
//!    the factory and applies the filtering rules.
//! 3. Each survivor is wrapped in a [`CapabilityExecutor`] and registered with
//!    the host, which hands back a visibility handle.
//! 4. [`DynamicRegistry`] keeps `(instance, handle, enabled)` per capability
//!    and is the only place visibility changes at runtime.
//! 5. The optional [`ManageCapabilities`] capability exposes the registry to
//!    the agent itself.

pub mod builtin;
pub mod capability;
pub mod catalogue;
pub mod executor;
pub mod factory;
pub mod filters;
pub mod registry;

pub use builtin::ManageCapabilities;
pub use capability::{
    Capability, CapabilityAnnotations, CapabilityCategory, CapabilityError, CapabilityOutput,
};
pub use catalogue::Catalogue;
pub use executor::{invocation_tags, CapabilityExecutor};
pub use factory::{
    create, CapabilityConstructor, CapabilityFamily, CapabilityInstance, DependencyBundle,
};
pub use filters::select;
pub use registry::{CapabilityStatus, DynamicRegistry};
