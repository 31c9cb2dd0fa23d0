//! # PanelForge Capabilities
//!
//! Typed, schema-validated units of work:
//!
//! - **Tool**: called by the model adapter mid-generation. Failures come
//!   back as text the model can read.
//! - **Prompt**: renders a template, calls the model adapter, optionally
//!   parses structured output. Failures are logged and yield `None`.
//! - **Flow**: the externally invoked unit. Failures are returned as a
//!   [`FlowError`](panelforge_core::FlowError) naming the flow.
//!
//! All three share one internal error type ([`CapabilityError`]) and only
//! convert to their external shape at the call boundary.
//!
//! Definitions are checked when they are built (`define_*`), so a missing
//! name, description or schema fails at startup rather than mid-request.

pub mod extract;
pub mod flow;
pub mod prompt;
pub mod registry;
pub mod schema;
pub mod tool;

pub use flow::{FlowCapability, FlowSpec, define_flow};
pub use prompt::{PromptCapability, PromptConfig, PromptSpec, define_prompt};
pub use registry::{Capability, CapabilityRegistry};
pub use tool::{ToolCapability, ToolSpec, define_tool};

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use panelforge_core::error::ValidationStage;
use panelforge_core::{BoxError, CapabilityError, ContextMap};
use serde_json::Value;

/// A user-supplied capability body: `(input, merged context) -> output`.
pub type Implementation =
    Arc<dyn Fn(Value, ContextMap) -> BoxFuture<'static, Result<Value, BoxError>> + Send + Sync>;

/// Box an async closure as an [`Implementation`].
pub fn implementation<F, Fut>(f: F) -> Implementation
where
    F: Fn(Value, ContextMap) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, BoxError>> + Send + 'static,
{
    Arc::new(move |input, context| Box::pin(f(input, context)))
}

pub(crate) fn require_name(name: &str) -> Result<(), CapabilityError> {
    if name.trim().is_empty() {
        return Err(CapabilityError::definition("<unnamed>", "name is required"));
    }
    Ok(())
}

/// Input schemas are mandatory and must be usable.
pub(crate) fn require_input_schema(name: &str, schema: Option<&Value>) -> Result<Value, CapabilityError> {
    let schema = schema.ok_or_else(|| CapabilityError::definition(name, "inputSchema is required"))?;
    schema::check_schema(schema).map_err(|e| CapabilityError::definition(name, format!("inputSchema: {e}")))?;
    Ok(schema.clone())
}

pub(crate) fn check_output_schema(name: &str, schema: Option<&Value>) -> Result<(), CapabilityError> {
    if let Some(schema) = schema {
        schema::check_schema(schema)
            .map_err(|e| CapabilityError::definition(name, format!("outputSchema: {e}")))?;
    }
    Ok(())
}

pub(crate) fn validate_stage(
    name: &str,
    stage: ValidationStage,
    value: &Value,
    schema: &Value,
) -> Result<(), CapabilityError> {
    schema::validate(value, schema).map_err(|reason| CapabilityError::Validation {
        name: name.to_string(),
        stage,
        reason,
    })
}
