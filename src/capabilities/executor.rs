//! Execution wrapper applied to every registered capability.
//!
//! Per invocation: validate the raw arguments against the input contract,
//! run the capability body, and emit exactly one telemetry event whatever the
//! outcome. Two entry points share that path:
//!
//! - [`CapabilityExecutor::handle`] for the host: failures become an error
//!   [`HostResult`], never an `Err`.
//! - [`CapabilityExecutor::execute`] for direct callers: failures are returned
//!   as [`ToolkitError`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::FutureExt;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::capability::CapabilityOutput;
use super::factory::CapabilityInstance;
use crate::context::ToolkitContext;
use crate::credentials::token_identity;
use crate::errors::ToolkitError;
use crate::host::{CapabilityRegistration, HostHandler, HostResult};
use crate::telemetry::{Telemetry, CAPABILITY_INVOKED_EVENT};

/// Telemetry fields shared by every invocation: the operational context and
/// the identity derived from the credential. Never the credential itself.
pub fn invocation_tags(context: Option<&ToolkitContext>, api_token: &str) -> Map<String, Value> {
    let mut tags = Map::new();
    if let Some(context) = context {
        tags.extend(context.telemetry_fields());
    }
    tags.extend(token_identity(api_token));
    tags
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("panicked: {}", detail)
}

pub struct CapabilityExecutor {
    instance: CapabilityInstance,
    validator: Option<jsonschema::Validator>,
    telemetry: Telemetry,
    tags: Arc<Map<String, Value>>,
}

impl std::fmt::Debug for CapabilityExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityExecutor")
            .field("instance", &self.instance)
            .field("validates_input", &self.validator.is_some())
            .finish()
    }
}

impl CapabilityExecutor {
    /// Wrap `instance`, compiling its input contract up front.
    pub fn new(
        instance: CapabilityInstance,
        telemetry: Telemetry,
        tags: Arc<Map<String, Value>>,
    ) -> Result<Self, ToolkitError> {
        let validator = match instance.capability.input_contract() {
            Some(schema) => Some(jsonschema::Validator::new(&schema).map_err(|e| {
                ToolkitError::Config(format!(
                    "invalid input contract for {}: {}",
                    instance.name(),
                    e
                ))
            })?),
            None => None,
        };
        Ok(Self {
            instance,
            validator,
            telemetry,
            tags,
        })
    }

    /// Name of the wrapped capability.
    pub fn name(&self) -> &str {
        self.instance.name()
    }

    pub fn instance(&self) -> &CapabilityInstance {
        &self.instance
    }

    /// Metadata the host lists for this capability.
    pub fn registration(&self) -> CapabilityRegistration {
        let capability = &self.instance.capability;
        let annotations = capability.annotations();
        CapabilityRegistration {
            title: annotations
                .title
                .clone()
                .unwrap_or_else(|| capability.name().to_string()),
            description: capability.description(),
            input_contract: capability.input_contract(),
            annotations,
        }
    }

    fn validate(&self, args: Value) -> Result<Value, ToolkitError> {
        let args = if args.is_null() {
            Value::Object(Map::new())
        } else {
            args
        };
        if let Some(validator) = &self.validator {
            let errors: Vec<String> = validator.iter_errors(&args).map(|e| e.to_string()).collect();
            if !errors.is_empty() {
                return Err(ToolkitError::InvalidArguments(errors.join("; ")));
            }
        }
        Ok(args)
    }

    async fn validate_then_execute(&self, args: Value) -> Result<CapabilityOutput, ToolkitError> {
        let input = self.validate(args)?;
        self.instance
            .capability
            .execute(input)
            .await
            .map_err(|e| ToolkitError::Execution {
                name: self.name().to_string(),
                message: e.to_string(),
            })
    }

    async fn run(&self, args: Value) -> Result<CapabilityOutput, ToolkitError> {
        let started = Instant::now();
        let result = AssertUnwindSafe(self.validate_then_execute(args))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(ToolkitError::Execution {
                    name: self.name().to_string(),
                    message: panic_message(panic.as_ref()),
                })
            });
        if let Err(e) = &result {
            log::warn!("{}", e);
        }
        self.track(started.elapsed(), result.is_err());
        result
    }

    fn track(&self, elapsed: Duration, is_error: bool) {
        let mut data = (*self.tags).clone();
        data.insert("capabilityName".into(), Value::from(self.name()));
        data.insert(
            "executionTimeMs".into(),
            Value::from(elapsed.as_millis() as u64),
        );
        data.insert("isError".into(), Value::from(is_error));
        data.insert(
            "capabilityFamily".into(),
            Value::from(self.instance.family.as_str()),
        );
        data.insert("invocationId".into(), Value::from(Uuid::new_v4().to_string()));
        data.insert("timestamp".into(), Value::from(Utc::now().to_rfc3339()));
        self.telemetry
            .emit(CAPABILITY_INVOKED_EVENT, &Value::Object(data));
    }

    /// Direct entry point: failures are returned to the caller.
    pub async fn execute(&self, args: Value) -> Result<CapabilityOutput, ToolkitError> {
        self.run(args).await
    }

    /// Host entry point: always produces a structured result.
    pub async fn handle(&self, args: Value) -> HostResult {
        match self.run(args).await {
            Ok(output) => HostResult::text(output.content),
            Err(e) => HostResult::error(e.to_string()),
        }
    }

    /// Boxed [`handle`](Self::handle) suitable for host registration.
    pub fn host_handler(self: &Arc<Self>) -> HostHandler {
        let executor = Arc::clone(self);
        Arc::new(move |args: Value| {
            let executor = Arc::clone(&executor);
            async move { executor.handle(args).await }.boxed()
        })
    }
}
