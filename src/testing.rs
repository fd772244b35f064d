//! Shared test doubles for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::api::{ApiClient, ApiError};
use crate::capabilities::{
    Capability, CapabilityCategory, CapabilityConstructor, CapabilityError, CapabilityOutput,
};
use crate::host::HostHandle;
use crate::telemetry::{TelemetryError, TelemetrySink};

/// Configurable capability that echoes its input.
pub struct StubCapability {
    name: String,
    category: CapabilityCategory,
    default_enabled: Option<bool>,
    contract: Option<Value>,
    failure: Option<String>,
    panic: Option<String>,
    calls: AtomicUsize,
}

impl StubCapability {
    pub fn new(name: &str, category: CapabilityCategory) -> Self {
        Self {
            name: name.to_string(),
            category,
            default_enabled: None,
            contract: None,
            failure: None,
            panic: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_default_enabled(mut self, enabled: bool) -> Self {
        self.default_enabled = Some(enabled);
        self
    }

    pub fn with_contract(mut self, contract: Value) -> Self {
        self.contract = Some(contract);
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Panic with `message` instead of returning.
    pub fn panicking(mut self, message: &str) -> Self {
        self.panic = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Capability for StubCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> String {
        format!("{} stub", self.name)
    }

    fn category(&self) -> CapabilityCategory {
        self.category
    }

    fn default_enabled(&self) -> Option<bool> {
        self.default_enabled
    }

    fn input_contract(&self) -> Option<Value> {
        self.contract.clone()
    }

    async fn execute(&self, input: Value) -> Result<CapabilityOutput, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.panic {
            panic!("{}", message);
        }
        match &self.failure {
            Some(message) => Err(CapabilityError::Execution(message.clone())),
            None => Ok(CapabilityOutput::text(format!("{} ok: {}", self.name, input))),
        }
    }
}

/// Remote-API constructor producing a [`StubCapability`].
pub fn stub_ctor(name: &'static str, category: CapabilityCategory) -> CapabilityConstructor {
    CapabilityConstructor::remote_api(move |_, _, _| Arc::new(StubCapability::new(name, category)))
}

/// API client returning a fixed response and recording every request.
#[derive(Default)]
pub struct StubApiClient {
    pub response: Value,
    pub requests: Mutex<Vec<(String, Option<Value>)>>,
}

impl StubApiClient {
    pub fn responding(response: Value) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ApiClient for StubApiClient {
    async fn request(&self, query: &str, variables: Option<Value>) -> Result<Value, ApiError> {
        self.requests.lock().push((query.to_string(), variables));
        Ok(self.response.clone())
    }
}

/// Host handle counting visibility calls.
#[derive(Default)]
pub struct CountingHandle {
    enables: AtomicUsize,
    disables: AtomicUsize,
}

impl CountingHandle {
    pub fn enables(&self) -> usize {
        self.enables.load(Ordering::SeqCst)
    }

    pub fn disables(&self) -> usize {
        self.disables.load(Ordering::SeqCst)
    }
}

impl HostHandle for CountingHandle {
    fn enable(&self) {
        self.enables.fetch_add(1, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.disables.fetch_add(1, Ordering::SeqCst);
    }
}

/// Telemetry sink that records events, optionally failing every emit.
#[derive(Default)]
pub struct RecordingTelemetrySink {
    events: Mutex<Vec<(String, Value)>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl RecordingTelemetrySink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl TelemetrySink for RecordingTelemetrySink {
    fn emit(&self, event_name: &str, data: &Value) -> Result<(), TelemetryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TelemetryError::Sink("unavailable".to_string()));
        }
        self.events.lock().push((event_name.to_string(), data.clone()));
        Ok(())
    }
}

/// Telemetry sink that panics on every emit.
pub struct PanickingTelemetrySink;

impl TelemetrySink for PanickingTelemetrySink {
    fn emit(&self, _event_name: &str, _data: &Value) -> Result<(), TelemetryError> {
        panic!("sink exploded");
    }
}
