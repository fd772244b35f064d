//! Doubles shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agent_toolkit::api::{ApiClient, ApiError};
use agent_toolkit::telemetry::TelemetryError;
use agent_toolkit::{
    Capability, CapabilityCategory, CapabilityConstructor, CapabilityError, CapabilityOutput,
    Catalogue, Telemetry, TelemetrySink, Toolkit, ToolkitConfig, ToolkitOptions,
};
use agent_toolkit::{InMemoryHost, ToolkitError};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

pub struct FakeCapability {
    name: &'static str,
    category: CapabilityCategory,
    default_enabled: Option<bool>,
    fails: bool,
}

#[async_trait]
impl Capability for FakeCapability {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> String {
        format!("Fake {}", self.name)
    }

    fn category(&self) -> CapabilityCategory {
        self.category
    }

    fn default_enabled(&self) -> Option<bool> {
        self.default_enabled
    }

    fn input_contract(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "additionalProperties": false
        }))
    }

    async fn execute(&self, input: Value) -> Result<CapabilityOutput, CapabilityError> {
        if self.fails {
            return Err(CapabilityError::Execution("remote refused".to_string()));
        }
        Ok(CapabilityOutput::text(format!("{} handled {}", self.name, input)))
    }
}

pub fn fake(
    name: &'static str,
    category: CapabilityCategory,
    default_enabled: Option<bool>,
) -> CapabilityConstructor {
    CapabilityConstructor::remote_api(move |_, _, _| {
        Arc::new(FakeCapability {
            name,
            category,
            default_enabled,
            fails: false,
        })
    })
}

pub fn failing(name: &'static str) -> CapabilityConstructor {
    CapabilityConstructor::remote_api(move |_, _, _| {
        Arc::new(FakeCapability {
            name,
            category: CapabilityCategory::Write,
            default_enabled: None,
            fails: true,
        })
    })
}

/// API client that must never be reached by the fakes.
pub struct UnreachableApi;

#[async_trait]
impl ApiClient for UnreachableApi {
    async fn request(&self, _query: &str, _variables: Option<Value>) -> Result<Value, ApiError> {
        Err(ApiError::GraphQl("unreachable in tests".to_string()))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(String, Value)>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl RecordingSink {
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

impl TelemetrySink for RecordingSink {
    fn emit(&self, event_name: &str, data: &Value) -> Result<(), TelemetryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TelemetryError::Sink("collector offline".to_string()));
        }
        self.events.lock().push((event_name.to_string(), data.clone()));
        Ok(())
    }
}

/// `{X (READ, default on), Y (WRITE, default off)}`.
pub fn scenario_catalogue() -> Catalogue {
    Catalogue::new()
        .with_api(fake("X", CapabilityCategory::Read, Some(true)))
        .with_api(fake("Y", CapabilityCategory::Write, Some(false)))
}

pub fn build(
    catalogue: Catalogue,
    config: Option<ToolkitConfig>,
    sink: Arc<RecordingSink>,
    host: &InMemoryHost,
) -> Result<Toolkit, ToolkitError> {
    let mut options = ToolkitOptions::new("test-token");
    if let Some(config) = config {
        options = options.with_config(config);
    }
    Toolkit::builder(options)
        .with_catalogue(catalogue)
        .with_api_client(Arc::new(UnreachableApi))
        .with_telemetry(Telemetry::always(sink))
        .build(host)
}
