//! Flow capabilities: the externally invoked unit of work.

use std::sync::Arc;

use panelforge_core::error::ValidationStage;
use panelforge_core::{CapabilityError, ContextFrame, ContextMap, ContextStore, FlowError};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{Implementation, check_output_schema, require_input_schema, require_name, validate_stage};

#[derive(Debug, Clone, Default)]
pub struct FlowSpec {
    pub name: String,
    pub input_schema: Option<Value>,
    pub output_schema: Option<Value>,
}

pub struct FlowCapability {
    name: String,
    input_schema: Value,
    output_schema: Option<Value>,
    store: Arc<ContextStore>,
    implementation: Implementation,
}

pub fn define_flow(
    spec: FlowSpec,
    store: Arc<ContextStore>,
    implementation: Implementation,
) -> Result<FlowCapability, CapabilityError> {
    require_name(&spec.name)?;
    let input_schema = require_input_schema(&spec.name, spec.input_schema.as_ref())?;
    check_output_schema(&spec.name, spec.output_schema.as_ref())?;

    Ok(FlowCapability {
        name: spec.name,
        input_schema,
        output_schema: spec.output_schema,
        store,
        implementation,
    })
}

impl FlowCapability {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the flow. Errors are wrapped with the flow's name; the caller handles them.
    pub async fn run(&self, input: Value, context: &ContextMap) -> Result<Value, FlowError> {
        self.try_run(input, context).await.map_err(|source| {
            warn!(capability = %self.name, error = %source, "Flow failed");
            FlowError {
                flow: self.name.clone(),
                source,
            }
        })
    }

    async fn try_run(&self, input: Value, context: &ContextMap) -> Result<Value, CapabilityError> {
        validate_stage(&self.name, ValidationStage::Input, &input, &self.input_schema)?;

        let merged = ContextFrame::new()
            .layer(self.store.snapshot())
            .layer(context.clone())
            .merged();

        debug!(capability = %self.name, "Running flow");
        let output = (self.implementation)(input, merged)
            .await
            .map_err(|e| CapabilityError::from_boxed(&self.name, e))?;

        if let Some(schema) = &self.output_schema {
            validate_stage(&self.name, ValidationStage::Output, &output, schema)?;
        }
        Ok(output)
    }
}

impl std::fmt::Debug for FlowCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowCapability")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
