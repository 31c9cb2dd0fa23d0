//! Tool capabilities: schema-checked functions the model adapter can call.

use std::sync::Arc;

use async_trait::async_trait;
use panelforge_core::error::ValidationStage;
use panelforge_core::{CapabilityError, ContextFrame, ContextMap, ContextStore, Tool};
use serde_json::Value;
use tracing::{debug, warn};

use crate::schema::strip_additional_properties;
use crate::{Implementation, check_output_schema, require_input_schema, require_name, validate_stage};

/// Declarative part of a tool.
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Option<Value>,
    pub output_schema: Option<Value>,
}

/// An executable, validated tool.
pub struct ToolCapability {
    name: String,
    description: String,
    input_schema: Value,
    output_schema: Option<Value>,
    /// Input schema as sent to the model
    parameters: Value,
    store: Arc<ContextStore>,
    implementation: Implementation,
}

/// Build a tool. Fails if the name, description or input schema is missing.
pub fn define_tool(
    spec: ToolSpec,
    store: Arc<ContextStore>,
    implementation: Implementation,
) -> Result<ToolCapability, CapabilityError> {
    require_name(&spec.name)?;
    if spec.description.trim().is_empty() {
        return Err(CapabilityError::definition(&spec.name, "description is required"));
    }
    let input_schema = require_input_schema(&spec.name, spec.input_schema.as_ref())?;
    check_output_schema(&spec.name, spec.output_schema.as_ref())?;

    Ok(ToolCapability {
        parameters: strip_additional_properties(&input_schema),
        name: spec.name,
        description: spec.description,
        input_schema,
        output_schema: spec.output_schema,
        store,
        implementation,
    })
}

impl ToolCapability {
    /// Run the tool, keeping the failure typed.
    pub async fn try_call(&self, input: Value, context: &ContextMap) -> Result<Value, CapabilityError> {
        validate_stage(&self.name, ValidationStage::Input, &input, &self.input_schema)?;

        let merged = ContextFrame::new()
            .layer(self.store.snapshot())
            .layer(context.clone())
            .merged();

        debug!(capability = %self.name, "Invoking tool");
        let output = (self.implementation)(input, merged)
            .await
            .map_err(|e| CapabilityError::from_boxed(&self.name, e))?;

        if let Some(schema) = &self.output_schema {
            validate_stage(&self.name, ValidationStage::Output, &output, schema)?;
        }
        Ok(output)
    }

    pub fn input_schema(&self) -> &Value {
        &self.input_schema
    }
}

#[async_trait]
impl Tool for ToolCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.parameters.clone()
    }

    async fn invoke(&self, arguments: Value, context: &ContextMap) -> String {
        match self.try_call(arguments, context).await {
            Ok(Value::String(text)) => text,
            Ok(other) => other.to_string(),
            Err(e) => {
                warn!(capability = %self.name, error = %e, "Tool call failed");
                format!("Error in tool '{}': {}", self.name, e)
            }
        }
    }
}

impl std::fmt::Debug for ToolCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCapability")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implementation;
    use panelforge_core::{BoxError, ErrorKind};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn rename_spec() -> ToolSpec {
        ToolSpec {
            name: "rename_scene".into(),
            description: "Rename a scene".into(),
            input_schema: Some(json!({
                "type": "object",
                "properties": { "sceneId": {"type": "string"}, "title": {"type": "string"} },
                "required": ["sceneId", "title"],
                "additionalProperties": false
            })),
            output_schema: Some(json!({"type": "string"})),
        }
    }

    fn echo_tool(store: Arc<ContextStore>) -> ToolCapability {
        define_tool(
            rename_spec(),
            store,
            implementation(|input, ctx| async move {
                let lang = ctx.get("language").and_then(Value::as_str).unwrap_or("?").to_string();
                Ok(json!(format!("{} -> {} ({lang})", input["sceneId"].as_str().unwrap_or(""), input["title"].as_str().unwrap_or(""))))
            }),
        )
        .unwrap()
    }

    #[test]
    fn empty_description_is_a_definition_error() {
        let spec = ToolSpec { description: String::new(), ..rename_spec() };
        let err = define_tool(spec, Arc::new(ContextStore::new()), implementation(|_, _| async { Ok(Value::Null) }))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Definition);
        assert!(err.to_string().contains("description"));
    }

    #[test]
    fn missing_input_schema_is_a_definition_error() {
        let spec = ToolSpec { input_schema: None, ..rename_spec() };
        let err = define_tool(spec, Arc::new(ContextStore::new()), implementation(|_, _| async { Ok(Value::Null) }))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Definition);
    }

    #[test]
    fn parameters_are_stripped_for_the_wire() {
        let tool = echo_tool(Arc::new(ContextStore::new()));
        let params = tool.parameters_schema();
        assert!(params.get("additionalProperties").is_none());
        assert_eq!(tool.input_schema()["additionalProperties"], false);
        assert_eq!(tool.to_definition().name, "rename_scene");
    }

    #[tokio::test]
    async fn call_context_overrides_global_store() {
        let store = Arc::new(ContextStore::new());
        store.set("language", json!("en"));
        let tool = echo_tool(store);

        let out = tool.invoke(json!({"sceneId": "s1", "title": "Dawn"}), &ContextMap::new()).await;
        assert_eq!(out, "s1 -> Dawn (en)");

        let mut ctx = ContextMap::new();
        ctx.insert("language".into(), json!("ja"));
        let out = tool.invoke(json!({"sceneId": "s1", "title": "Dawn"}), &ctx).await;
        assert_eq!(out, "s1 -> Dawn (ja)");
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_implementation() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let tool = define_tool(
            rename_spec(),
            Arc::new(ContextStore::new()),
            implementation(move |_, _| {
                flag.store(true, Ordering::SeqCst);
                async { Ok(json!("done")) }
            }),
        )
        .unwrap();

        let out = tool.invoke(json!({"sceneId": "s1"}), &ContextMap::new()).await;
        assert!(out.starts_with("Error in tool 'rename_scene':"), "{out}");
        assert!(out.contains("missing required field 'title'"));
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn implementation_failure_becomes_text() {
        let tool = define_tool(
            rename_spec(),
            Arc::new(ContextStore::new()),
            implementation(|_, _| async { Err::<Value, BoxError>("store offline".into()) }),
        )
        .unwrap();
        let out = tool.invoke(json!({"sceneId": "s1", "title": "x"}), &ContextMap::new()).await;
        assert!(out.contains("store offline"));
    }

    #[tokio::test]
    async fn output_validation_failure_keeps_kind() {
        let tool = define_tool(
            rename_spec(),
            Arc::new(ContextStore::new()),
            implementation(|_, _| async { Ok(json!(42)) }),
        )
        .unwrap();
        let err = tool
            .try_call(json!({"sceneId": "s1", "title": "x"}), &ContextMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().starts_with("output validation failed"));
    }
}
