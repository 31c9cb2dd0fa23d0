//! `ProviderAdapter`: the model adapter backed by a [`Provider`].
//!
//! One `send` runs a bounded tool loop:
//!
//! 1. Send the conversation plus tool definitions. On the first round a
//!    forced request asks for `tool_choice = "required"`.
//! 2. If the reply carries tool calls, run each one through the [`Tool`]
//!    boundary and append the results as tool messages.
//! 3. Repeat until the model answers without tool calls, or fail with
//!    [`ProviderError::ToolLoopExceeded`].
//!
//! Every provider call is bounded by the request timeout.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use panelforge_config::AppConfig;
use panelforge_core::adapter::{GenerateRequest, ModelAdapter};
use panelforge_core::error::ProviderError;
use panelforge_core::message::{Message, MessageToolCall};
use panelforge_core::provider::{GeneratedImage, ImageRequest, Provider, ProviderRequest, ToolChoice};
use panelforge_core::{ContextMap, Tool};
use tracing::{debug, info, warn};

use crate::router::build_from_config;

pub struct ProviderAdapter {
    provider: Arc<dyn Provider>,
    model: String,
    image_model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    request_timeout: Duration,
    max_tool_iterations: u32,
}

impl ProviderAdapter {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            image_model: "gpt-image-1".into(),
            temperature: 0.7,
            max_tokens: None,
            request_timeout: Duration::from_secs(120),
            max_tool_iterations: 4,
        }
    }

    /// Build the adapter for the configured default provider and model.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let router = build_from_config(config);
        let (provider, model) = router.resolve(&config.default_model).ok_or_else(|| {
            ProviderError::NotConfigured(format!("No provider named '{}'", config.default_provider))
        })?;

        info!(provider = provider.name(), model = %model, "Model adapter ready");

        Ok(Self::new(provider, model)
            .with_image_model(&config.image.model)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
            .with_request_timeout(Duration::from_secs(config.adapter.request_timeout_secs))
            .with_max_tool_iterations(config.adapter.max_tool_iterations))
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the maximum number of model rounds per `send`. Clamped to at least 1.
    pub fn with_max_tool_iterations(mut self, max: u32) -> Self {
        self.max_tool_iterations = max.max(1);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn with_deadline<T, F>(&self, what: &str, call: F) -> Result<T, ProviderError>
    where
        F: std::future::Future<Output = Result<T, ProviderError>>,
    {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    provider = self.provider.name(),
                    timeout_secs = self.request_timeout.as_secs(),
                    "{what} timed out"
                );
                Err(ProviderError::Timeout(format!(
                    "{what} did not finish within {}s",
                    self.request_timeout.as_secs()
                )))
            }
        }
    }
}

/// Run one requested tool call. Anything that goes wrong becomes text the
/// model can read on its next round.
async fn run_tool_call(tools: &[Arc<dyn Tool>], call: &MessageToolCall, context: &ContextMap) -> String {
    let Some(tool) = tools.iter().find(|t| t.name() == call.name) else {
        warn!(tool = %call.name, "Model requested an unknown tool");
        return format!("Error: unknown tool '{}'", call.name);
    };

    let arguments = if call.arguments.trim().is_empty() {
        serde_json::Value::Object(Default::default())
    } else {
        match serde_json::from_str(&call.arguments) {
            Ok(arguments) => arguments,
            Err(e) => return format!("Error: arguments for '{}' are not valid JSON: {e}", call.name),
        }
    };

    tool.invoke(arguments, context).await
}

#[async_trait]
impl ModelAdapter for ProviderAdapter {
    async fn send(&self, request: GenerateRequest) -> Result<Vec<Message>, ProviderError> {
        let definitions: Vec<_> = request.tools.iter().map(|t| t.to_definition()).collect();
        let model = request.params.model.clone().unwrap_or_else(|| self.model.clone());
        let mut conversation = request.messages;
        let mut produced = Vec::new();

        for round in 0..self.max_tool_iterations {
            let tool_choice = if round == 0 && request.force_tool_call && !definitions.is_empty() {
                ToolChoice::Required
            } else {
                ToolChoice::Auto
            };

            let provider_request = ProviderRequest {
                model: model.clone(),
                messages: conversation.clone(),
                temperature: request.params.temperature.unwrap_or(self.temperature),
                max_tokens: request.params.max_tokens.or(self.max_tokens),
                tools: definitions.clone(),
                tool_choice,
            };

            debug!(round, model = %model, ?tool_choice, "Model adapter round");

            let response = self
                .with_deadline("Completion request", self.provider.complete(provider_request))
                .await?;

            let message = response.message;
            if message.tool_calls.is_empty() {
                produced.push(message);
                return Ok(produced);
            }

            let calls = message.tool_calls.clone();
            conversation.push(message.clone());
            produced.push(message);

            for call in &calls {
                debug!(tool = %call.name, id = %call.id, "Running tool call");
                let output = run_tool_call(&request.tools, call, &request.context).await;
                let result = Message::tool_result(&call.id, output);
                conversation.push(result.clone());
                produced.push(result);
            }
        }

        warn!(
            max_iterations = self.max_tool_iterations,
            "Model kept calling tools past the iteration limit"
        );
        Err(ProviderError::ToolLoopExceeded {
            max_iterations: self.max_tool_iterations,
        })
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, ProviderError> {
        self.with_deadline(
            "Image generation",
            self.provider.generate_image(&self.image_model, request),
        )
        .await
    }
}
