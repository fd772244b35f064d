//! In-process [`CapabilityHost`] for embedding and tests.
//!
//! Keeps registrations in insertion order, tracks per-name visibility via the
//! handles it gives out, and routes calls to visible capabilities.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use super::{CapabilityHost, CapabilityRegistration, HostError, HostHandle, HostHandler, HostResult};

struct HostEntry {
    name: String,
    registration: CapabilityRegistration,
    handler: HostHandler,
    visible: AtomicBool,
    enable_calls: AtomicUsize,
    disable_calls: AtomicUsize,
}

impl HostHandle for HostEntry {
    fn enable(&self) {
        self.enable_calls.fetch_add(1, Ordering::SeqCst);
        self.visible.store(true, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.disable_calls.fetch_add(1, Ordering::SeqCst);
        self.visible.store(false, Ordering::SeqCst);
    }
}

/// A capability as the host lists it to the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedCapability {
    pub name: String,
    pub registration: CapabilityRegistration,
}

/// How often a handle's visibility primitives were called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandleCalls {
    pub enable: usize,
    pub disable: usize,
}

#[derive(Default)]
pub struct InMemoryHost {
    entries: RwLock<Vec<Arc<HostEntry>>>,
}

impl std::fmt::Debug for InMemoryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryHost")
            .field("registered", &self.names())
            .finish()
    }
}

impl InMemoryHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, name: &str) -> Option<Arc<HostEntry>> {
        self.entries
            .read()
            .iter()
            .find(|e| e.name == name)
            .cloned()
    }

    /// Every registered name, visible or not.
    pub fn names(&self) -> Vec<String> {
        self.entries.read().iter().map(|e| e.name.clone()).collect()
    }

    /// What the agent would see on a listing right now.
    pub fn list_visible(&self) -> Vec<ListedCapability> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.visible.load(Ordering::SeqCst))
            .map(|e| ListedCapability {
                name: e.name.clone(),
                registration: e.registration.clone(),
            })
            .collect()
    }

    /// Visibility of `name`, `None` if never registered.
    pub fn is_visible(&self, name: &str) -> Option<bool> {
        self.entry(name).map(|e| e.visible.load(Ordering::SeqCst))
    }

    /// How often the handle of `name` was asked to enable or disable.
    pub fn handle_calls(&self, name: &str) -> Option<HandleCalls> {
        self.entry(name).map(|e| HandleCalls {
            enable: e.enable_calls.load(Ordering::SeqCst),
            disable: e.disable_calls.load(Ordering::SeqCst),
        })
    }

    /// Dispatch a call the way an agent turn would.
    ///
    /// Hidden or unknown capabilities produce an error result.
    pub async fn call(&self, name: &str, args: Value) -> HostResult {
        let Some(entry) = self.entry(name) else {
            return HostResult::error(format!("Tool {} not found", name));
        };
        if !entry.visible.load(Ordering::SeqCst) {
            return HostResult::error(format!("Tool {} disabled", name));
        }
        let handler = Arc::clone(&entry.handler);
        handler(args).await
    }
}

impl CapabilityHost for InMemoryHost {
    fn register_capability(
        &self,
        name: &str,
        registration: CapabilityRegistration,
        handler: HostHandler,
    ) -> Result<Arc<dyn HostHandle>, HostError> {
        let mut entries = self.entries.write();
        if entries.iter().any(|e| e.name == name) {
            return Err(HostError::DuplicateName(name.to_string()));
        }
        let entry = Arc::new(HostEntry {
            name: name.to_string(),
            registration,
            handler,
            visible: AtomicBool::new(true),
            enable_calls: AtomicUsize::new(0),
            disable_calls: AtomicUsize::new(0),
        });
        entries.push(Arc::clone(&entry));
        Ok(entry)
    }
}
