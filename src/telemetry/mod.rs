//! Telemetry for capability invocations.
//!
//! Emission is fire-and-forget: sinks are synchronous and must not block,
//! and every sink failure is swallowed by [`Telemetry::emit`]. Telemetry can
//! be switched off with `TOOLKIT_TELEMETRY_OPT_OUT` or `OTEL_SDK_DISABLED`.
//!
//! No raw credentials or capability arguments are ever part of an event.

use std::env;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

/// Event emitted once per capability invocation.
pub const CAPABILITY_INVOKED_EVENT: &str = "capability_invoked";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("telemetry channel closed")]
    ChannelClosed,

    #[error("telemetry sink failed: {0}")]
    Sink(String),
}

/// Destination for telemetry events.
pub trait TelemetrySink: Send + Sync {
    fn emit(&self, event_name: &str, data: &Value) -> Result<(), TelemetryError>;
}

/// Writes events through the `log` facade at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTelemetrySink;

impl TelemetrySink for LogTelemetrySink {
    fn emit(&self, event_name: &str, data: &Value) -> Result<(), TelemetryError> {
        log::debug!(target: "agent_toolkit::telemetry", "{} {}", event_name, data);
        Ok(())
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn emit(&self, _event_name: &str, _data: &Value) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// A telemetry event queued for an async exporter.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryEvent {
    pub name: String,
    pub data: Value,
}

/// Forwards events onto an unbounded channel; the receiving task exports them.
#[derive(Debug, Clone)]
pub struct ChannelTelemetrySink {
    tx: mpsc::UnboundedSender<TelemetryEvent>,
}

impl ChannelTelemetrySink {
    /// Create a sink and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TelemetryEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl TelemetrySink for ChannelTelemetrySink {
    fn emit(&self, event_name: &str, data: &Value) -> Result<(), TelemetryError> {
        self.tx
            .send(TelemetryEvent {
                name: event_name.to_string(),
                data: data.clone(),
            })
            .map_err(|_| TelemetryError::ChannelClosed)
    }
}

/// Check whether telemetry is disabled via environment variables.
pub fn is_telemetry_disabled() -> bool {
    let flag = |name: &str| {
        let value = env::var(name).unwrap_or_default().to_lowercase();
        value == "true" || value == "1"
    };
    flag("TOOLKIT_TELEMETRY_OPT_OUT") || flag("OTEL_SDK_DISABLED")
}

/// Error-swallowing front for a [`TelemetrySink`].
#[derive(Clone)]
pub struct Telemetry {
    sink: Arc<dyn TelemetrySink>,
    enabled: bool,
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new(Arc::new(LogTelemetrySink))
    }
}

impl Telemetry {
    /// Telemetry through `sink`, unless opted out via the environment.
    pub fn new(sink: Arc<dyn TelemetrySink>) -> Self {
        Self {
            sink,
            enabled: !is_telemetry_disabled(),
        }
    }

    /// Telemetry through `sink` regardless of the environment.
    pub fn always(sink: Arc<dyn TelemetrySink>) -> Self {
        Self {
            sink,
            enabled: true,
        }
    }

    /// A handle that never emits.
    pub fn disabled() -> Self {
        Self {
            sink: Arc::new(NoopTelemetrySink),
            enabled: false,
        }
    }

    /// Whether events reach a sink.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Emit an event. Never fails and never blocks on the sink.
    pub fn emit(&self, event_name: &str, data: &Value) {
        if !self.enabled {
            return;
        }
        let sink = &self.sink;
        let result =
            std::panic::catch_unwind(AssertUnwindSafe(|| sink.emit(event_name, data)));
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::debug!("Dropped telemetry event {}: {}", event_name, e),
            Err(_) => log::error!("Telemetry sink panicked on {}", event_name),
        }
    }
}
