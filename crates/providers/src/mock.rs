//! Scripted provider for tests and offline demos.

use std::sync::Mutex;

use async_trait::async_trait;
use panelforge_core::error::ProviderError;
use panelforge_core::message::{Message, MessageToolCall};
use panelforge_core::provider::{GeneratedImage, ImageRequest, Provider, ProviderRequest, ProviderResponse, Usage};

/// A provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the request. Running out of responses is a `NotConfigured`
/// error. Image requests succeed with a URL derived from the prompt.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that returns a single text response (no tool calls).
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![make_text_response(text)])
    }

    /// Create a provider that first returns tool calls, then a final answer.
    pub fn tool_then_answer(tool_calls: Vec<MessageToolCall>, thought: &str, answer: &str) -> Self {
        Self::new(vec![
            make_tool_call_response(tool_calls, thought),
            make_text_response(answer),
        ])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    /// Every chat request received so far, in order.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self
            .requests
            .lock()
            .map_err(|_| ProviderError::NotConfigured("mock state poisoned".into()))?;
        let responses = self
            .responses
            .lock()
            .map_err(|_| ProviderError::NotConfigured("mock state poisoned".into()))?;

        let call = requests.len();
        requests.push(request);

        responses.get(call).cloned().ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "SequentialMockProvider: no more responses (call #{call}, have {})",
                responses.len()
            ))
        })
    }

    async fn generate_image(&self, model: &str, request: ImageRequest) -> Result<GeneratedImage, ProviderError> {
        let slug: String = request
            .prompt
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .take(40)
            .collect();
        Ok(GeneratedImage {
            url: Some(format!("https://img.example/generated/{slug}.png")),
            b64_json: None,
            revised_prompt: None,
            model: model.to_string(),
        })
    }
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a response with tool calls and optional thought content.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>, thought: &str) -> ProviderResponse {
    let mut response = make_text_response(thought);
    response.message.tool_calls = tool_calls;
    response
}

/// Helper to create a tool call.
pub fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: args.to_string(),
    }
}
