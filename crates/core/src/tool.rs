//! Tool trait: the abstraction the model adapter calls during generation.
//!
//! A tool never fails from the adapter's point of view: every problem is
//! reported back as text the model can read and react to.

use async_trait::async_trait;
use crate::context::ContextMap;
use crate::provider::ToolDefinition;

/// An executable tool handed to the model adapter.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "update_scene").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters, in the form sent to the LLM.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Run the tool. Failures come back as a diagnostic string.
    async fn invoke(&self, arguments: serde_json::Value, context: &ContextMap) -> String;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { "echo" }
        fn description(&self) -> &str { "Echoes back the input" }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn invoke(&self, arguments: serde_json::Value, context: &ContextMap) -> String {
            let text = arguments["text"].as_str().unwrap_or("");
            match context.get("prefix").and_then(|v| v.as_str()) {
                Some(prefix) => format!("{prefix}{text}"),
                None => text.to_string(),
            }
        }
    }

    #[test]
    fn definition_carries_schema() {
        let def = EchoTool.to_definition();
        assert_eq!(def.name, "echo");
        assert_eq!(def.parameters["required"][0], "text");
    }

    #[tokio::test]
    async fn invoke_sees_context() {
        let mut ctx = ContextMap::new();
        ctx.insert("prefix".into(), serde_json::json!("> "));
        let out = EchoTool
            .invoke(serde_json::json!({"text": "hello"}), &ctx)
            .await;
        assert_eq!(out, "> hello");
    }
}
