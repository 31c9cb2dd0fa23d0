//! Prompt capabilities: a template rendered against input and context,
//! sent to the model adapter, with optional structured output.

use std::sync::Arc;

use panelforge_core::error::ValidationStage;
use panelforge_core::{
    CapabilityError, ContextFrame, ContextMap, ContextStore, GenerateRequest, GenerationParams, Message,
    ModelAdapter, Tool,
};
use panelforge_template::Template;
use serde_json::Value;
use tracing::{debug, error};

use crate::extract::extract_json;
use crate::schema::strip_additional_properties;
use crate::{check_output_schema, require_input_schema, require_name, validate_stage};

/// Context key under which the output schema is exposed to templates.
pub const OUTPUT_SCHEMA_KEY: &str = "outputSchema";

/// Declarative part of a prompt.
#[derive(Clone, Default)]
pub struct PromptSpec {
    pub name: String,
    pub input_schema: Option<Value>,
    pub output_schema: Option<Value>,
    pub template: String,
    pub tools: Vec<Arc<dyn Tool>>,
    pub force_tool_call: bool,
}

/// Per-definition settings.
#[derive(Debug, Clone, Default)]
pub struct PromptConfig {
    /// Sits between the global store and the call context
    pub context: ContextMap,
    pub params: GenerationParams,
}

pub struct PromptCapability {
    name: String,
    input_schema: Value,
    output_schema: Option<Value>,
    /// `output_schema` with strict-API markers removed
    output_projection: Option<Value>,
    template: Template,
    tools: Vec<Arc<dyn Tool>>,
    force_tool_call: bool,
    config: PromptConfig,
    store: Arc<ContextStore>,
    adapter: Arc<dyn ModelAdapter>,
}

/// Build a prompt. The template is parsed strictly here, so a malformed
/// template is a definition error rather than a runtime surprise.
pub fn define_prompt(
    spec: PromptSpec,
    config: PromptConfig,
    store: Arc<ContextStore>,
    adapter: Arc<dyn ModelAdapter>,
) -> Result<PromptCapability, CapabilityError> {
    require_name(&spec.name)?;
    let input_schema = require_input_schema(&spec.name, spec.input_schema.as_ref())?;
    check_output_schema(&spec.name, spec.output_schema.as_ref())?;

    if spec.template.trim().is_empty() {
        return Err(CapabilityError::definition(&spec.name, "template is required"));
    }
    let template = Template::parse(&spec.template)
        .map_err(|e| CapabilityError::definition(&spec.name, format!("template: {e}")))?;

    if spec.force_tool_call && spec.tools.is_empty() {
        return Err(CapabilityError::definition(
            &spec.name,
            "forceToolCall requires at least one tool",
        ));
    }

    Ok(PromptCapability {
        output_projection: spec.output_schema.as_ref().map(strip_additional_properties),
        name: spec.name,
        input_schema,
        output_schema: spec.output_schema,
        template,
        tools: spec.tools,
        force_tool_call: spec.force_tool_call,
        config,
        store,
        adapter,
    })
}

impl PromptCapability {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the prompt. Any failure is logged and yields `None`.
    pub async fn call(&self, input: Value, context: &ContextMap, history: &[Message]) -> Option<Value> {
        match self.try_call(input, context, history).await {
            Ok(value) => Some(value),
            Err(e) => {
                error!(capability = %self.name, kind = ?e.kind(), error = %e, "Prompt failed");
                None
            }
        }
    }

    /// Run the prompt, keeping the failure typed.
    pub async fn try_call(
        &self,
        input: Value,
        context: &ContextMap,
        history: &[Message],
    ) -> Result<Value, CapabilityError> {
        validate_stage(&self.name, ValidationStage::Input, &input, &self.input_schema)?;

        let mut merged = ContextFrame::new()
            .layer(self.store.snapshot())
            .layer(self.config.context.clone())
            .layer(context.clone())
            .merged();
        if let Some(projection) = &self.output_projection {
            merged.insert(OUTPUT_SCHEMA_KEY.into(), projection.clone());
        }

        let rendered = self.template.render(&self.render_data(input, &merged));
        debug!(capability = %self.name, chars = rendered.len(), "Rendered prompt");

        let mut messages = history.to_vec();
        messages.push(Message::user(rendered));

        let request = GenerateRequest {
            messages,
            tools: self.tools.clone(),
            params: self.config.params.clone(),
            force_tool_call: self.force_tool_call,
            context: merged,
        };
        let produced = self
            .adapter
            .send(request)
            .await
            .map_err(|e| CapabilityError::execution(&self.name, e))?;

        let raw = produced
            .last()
            .map(|m| m.content.clone())
            .ok_or_else(|| CapabilityError::execution(&self.name, "model returned no messages"))?;

        let Some(schema) = &self.output_schema else {
            return Ok(Value::String(raw));
        };

        let parsed = extract_json(&raw).ok_or_else(|| CapabilityError::Validation {
            name: self.name.clone(),
            stage: ValidationStage::Output,
            reason: "model output is not JSON".into(),
        })?;
        validate_stage(&self.name, ValidationStage::Output, &parsed, schema)?;
        Ok(parsed)
    }

    /// `{ ...input, context }`
    fn render_data(&self, input: Value, merged: &ContextMap) -> Value {
        let mut data = match input {
            Value::Object(fields) => fields,
            _ => ContextMap::new(),
        };
        data.insert("context".into(), Value::Object(merged.clone()));
        Value::Object(data)
    }
}

impl std::fmt::Debug for PromptCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptCapability")
            .field("name", &self.name)
            .field("tools", &self.tools.iter().map(|t| t.name().to_string()).collect::<Vec<_>>())
            .field("force_tool_call", &self.force_tool_call)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CannedAdapter;
    use crate::{ToolSpec, define_tool, implementation};
    use panelforge_core::ErrorKind;
    use serde_json::json;

    fn spec(template: &str) -> PromptSpec {
        PromptSpec {
            name: "describe".into(),
            input_schema: Some(json!({
                "type": "object",
                "properties": { "topic": {"type": "string"} },
                "required": ["topic"]
            })),
            template: template.into(),
            ..Default::default()
        }
    }

    fn ctx(pairs: Value) -> ContextMap {
        panelforge_core::context::as_context_map(pairs)
    }

    #[test]
    fn malformed_template_is_rejected_at_definition() {
        let adapter = Arc::new(CannedAdapter::new(vec![]));
        let err = define_prompt(
            spec("{{#each xs}}no close"),
            PromptConfig::default(),
            Arc::new(ContextStore::new()),
            adapter,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Definition);
    }

    #[test]
    fn forced_tool_call_needs_tools() {
        let adapter = Arc::new(CannedAdapter::new(vec![]));
        let err = define_prompt(
            PromptSpec { force_tool_call: true, ..spec("x") },
            PromptConfig::default(),
            Arc::new(ContextStore::new()),
            adapter,
        )
        .unwrap_err();
        assert!(err.to_string().contains("forceToolCall"));
    }

    #[tokio::test]
    async fn context_precedence_reaches_template() {
        let store = Arc::new(ContextStore::with_values(ctx(json!({"a": 1}))));
        let adapter = Arc::new(CannedAdapter::new(vec!["ok"]));
        let prompt = define_prompt(
            spec("{{topic}} a={{context.a}} b={{context.b}}"),
            PromptConfig { context: ctx(json!({"a": 2, "b": 1})), ..Default::default() },
            store,
            adapter.clone(),
        )
        .unwrap();

        let out = prompt.call(json!({"topic": "sea"}), &ctx(json!({"a": 3})), &[]).await;
        assert_eq!(out, Some(json!("ok")));
        assert_eq!(adapter.last_prompt(), "sea a=3 b=1");
    }

    #[tokio::test]
    async fn history_precedes_rendered_prompt() {
        let adapter = Arc::new(CannedAdapter::new(vec!["ok"]));
        let prompt = define_prompt(
            spec("About {{topic}}"),
            PromptConfig::default(),
            Arc::new(ContextStore::new()),
            adapter.clone(),
        )
        .unwrap();

        let history = vec![Message::user("hi"), Message::assistant("hello")];
        prompt.call(json!({"topic": "x"}), &ContextMap::new(), &history).await;

        let seen = adapter.seen.lock().unwrap();
        let contents: Vec<_> = seen[0].messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hi", "hello", "About x"]);
    }

    #[tokio::test]
    async fn structured_output_is_parsed_and_validated() {
        let adapter = Arc::new(CannedAdapter::new(vec![
            "```json\n{\"title\": \"Dawn\"}\n```",
            "{\"name\": 5}",
        ]));
        let prompt = define_prompt(
            PromptSpec {
                output_schema: Some(json!({
                    "type": "object",
                    "properties": {"title": {"type": "string"}},
                    "required": ["title"],
                    "additionalProperties": false
                })),
                ..spec("Schema: {{context.outputSchema}}")
            },
            PromptConfig::default(),
            Arc::new(ContextStore::new()),
            adapter.clone(),
        )
        .unwrap();

        let first = prompt.call(json!({"topic": "x"}), &ContextMap::new(), &[]).await;
        assert_eq!(first, Some(json!({"title": "Dawn"})));
        assert!(!adapter.last_prompt().contains("additionalProperties"));
        assert!(adapter.last_prompt().contains("\"required\":[\"title\"]"));

        let second = prompt.call(json!({"topic": "x"}), &ContextMap::new(), &[]).await;
        assert_eq!(second, None);
    }

    #[tokio::test]
    async fn failures_yield_none() {
        let adapter = Arc::new(CannedAdapter::new(vec![]));
        let prompt = define_prompt(
            spec("{{topic}}"),
            PromptConfig::default(),
            Arc::new(ContextStore::new()),
            adapter.clone(),
        )
        .unwrap();

        // invalid input: adapter never called
        assert_eq!(prompt.call(json!({}), &ContextMap::new(), &[]).await, None);
        assert!(adapter.seen.lock().unwrap().is_empty());

        // adapter error
        let err = prompt.try_call(json!({"topic": "x"}), &ContextMap::new(), &[]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Execution);
    }

    #[tokio::test]
    async fn tools_and_force_flag_are_forwarded() {
        let store = Arc::new(ContextStore::new());
        let tool = define_tool(
            ToolSpec {
                name: "noop".into(),
                description: "Does nothing".into(),
                input_schema: Some(json!({"type": "object"})),
                output_schema: None,
            },
            store.clone(),
            implementation(|_, _| async { Ok(Value::Null) }),
        )
        .unwrap();

        let adapter = Arc::new(CannedAdapter::new(vec!["done"]));
        let prompt = define_prompt(
            PromptSpec { tools: vec![Arc::new(tool)], force_tool_call: true, ..spec("{{topic}}") },
            PromptConfig::default(),
            store,
            adapter.clone(),
        )
        .unwrap();

        prompt.call(json!({"topic": "x"}), &ContextMap::new(), &[]).await;
        let seen = adapter.seen.lock().unwrap();
        assert!(seen[0].force_tool_call);
        assert_eq!(seen[0].tools[0].name(), "noop");
    }
}
