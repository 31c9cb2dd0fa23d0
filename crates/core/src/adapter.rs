//! Model adapter contract: how prompts talk to a language model.
//!
//! The adapter owns the tool loop: it sends the conversation, runs any
//! tools the model asks for, and returns every message it produced.
//! Callers only look at the last message's content.

use async_trait::async_trait;
use std::sync::Arc;
use crate::context::ContextMap;
use crate::error::ProviderError;
use crate::message::Message;
use crate::provider::{GeneratedImage, ImageRequest};
use crate::tool::Tool;

/// Sampling parameters for one generation.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    /// Overrides the adapter's default model
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Everything a prompt hands to the adapter.
#[derive(Clone, Default)]
pub struct GenerateRequest {
    /// Conversation so far; the rendered prompt is the last entry
    pub messages: Vec<Message>,

    /// Tools the model may call
    pub tools: Vec<Arc<dyn Tool>>,

    pub params: GenerationParams,

    /// Require a tool call on the first round
    pub force_tool_call: bool,

    /// Context forwarded to tool invocations
    pub context: ContextMap,
}

impl std::fmt::Debug for GenerateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateRequest")
            .field("messages", &self.messages.len())
            .field(
                "tools",
                &self.tools.iter().map(|t| t.name().to_string()).collect::<Vec<_>>(),
            )
            .field("params", &self.params)
            .field("force_tool_call", &self.force_tool_call)
            .finish()
    }
}

/// The language-model collaborator used by prompts and image handlers.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Run a generation. Returns the messages produced, in order.
    async fn send(&self, request: GenerateRequest) -> Result<Vec<Message>, ProviderError>;

    /// Produce an image from a prompt and optional reference images.
    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, ProviderError>;
}

/// Loads reference images so they can be inlined into image requests.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch `url` and return it as a `data:` URL.
    async fn fetch_data_url(&self, url: &str) -> Result<String, ProviderError>;
}
