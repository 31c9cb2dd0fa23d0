//! The assistant: the outermost boundary of a request.
//!
//! [`Assistant::assist`] always returns an [`AssistResult`]. Missing
//! projects, classifier failures, handler errors and even panics inside a
//! handler come back as `AssistResult::Error`.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use panelforge_capabilities::{CapabilityRegistry, PromptConfig, PromptSpec, define_prompt};
use panelforge_config::AssistantConfig;
use panelforge_core::{
    ActionDescriptor, CapabilityError, ContentStore, ContextStore, GenerationParams, ImageFetcher,
    ModelAdapter,
};
use panelforge_template::Template;
use panelforge_tools::{UPDATABLE_KINDS, register_content_tools, tool_name};
use tracing::{error, info, warn};

use crate::handlers::{self, HandlerContext};
use crate::planner::{IntentPlanner, recent};
use crate::result::{AssistRequest, AssistResult, ErrorCode, Failure};
use crate::{CLASSIFY_PROMPT, GENERATABLE_KINDS, edit_prompt, generation_prompt, prompts, schemas};

/// Collaborators the assistant works through.
#[derive(Clone)]
pub struct AssistantDeps {
    pub store: Arc<dyn ContentStore>,
    pub adapter: Arc<dyn ModelAdapter>,
    pub fetcher: Arc<dyn ImageFetcher>,
    /// Lowest-precedence context layer shared by every capability
    pub context: Arc<ContextStore>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantSettings {
    pub history_limit: usize,
    pub persist_generated: bool,
    pub persist_images: bool,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            history_limit: 10,
            persist_generated: false,
            persist_images: true,
        }
    }
}

impl From<&AssistantConfig> for AssistantSettings {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            history_limit: config.history_limit,
            persist_generated: config.persist_generated,
            persist_images: config.persist_images,
        }
    }
}

pub struct Assistant {
    store: Arc<dyn ContentStore>,
    registry: CapabilityRegistry,
    planner: IntentPlanner,
    settings: AssistantSettings,
    image_template: Template,
}

impl Assistant {
    /// Register every capability the assistant uses. Fails on the first
    /// invalid definition.
    pub fn new(deps: AssistantDeps, settings: AssistantSettings) -> Result<Self, CapabilityError> {
        let mut registry = CapabilityRegistry::new();
        register_content_tools(&mut registry, deps.store.clone(), deps.context.clone())?;

        registry.register(define_prompt(
            PromptSpec {
                name: CLASSIFY_PROMPT.into(),
                input_schema: Some(schemas::classify_input()),
                output_schema: Some(schemas::action_descriptor()),
                template: prompts::CLASSIFY.into(),
                ..Default::default()
            },
            PromptConfig {
                params: GenerationParams {
                    temperature: Some(0.2),
                    ..Default::default()
                },
                ..Default::default()
            },
            deps.context.clone(),
            deps.adapter.clone(),
        )?)?;

        for kind in GENERATABLE_KINDS {
            let name = generation_prompt(kind);
            let template = prompts::generation(kind)
                .ok_or_else(|| CapabilityError::definition(&name, "no template for this content type"))?;
            registry.register(define_prompt(
                PromptSpec {
                    name,
                    input_schema: Some(schemas::generate_input()),
                    output_schema: Some(schemas::generate_output(kind)),
                    template,
                    ..Default::default()
                },
                PromptConfig::default(),
                deps.context.clone(),
                deps.adapter.clone(),
            )?)?;
        }

        for kind in UPDATABLE_KINDS {
            let name = edit_prompt(kind);
            let tool = registry
                .tool_handle(&tool_name(kind))
                .ok_or_else(|| CapabilityError::definition(&name, "update tool is not registered"))?;
            registry.register(define_prompt(
                PromptSpec {
                    name,
                    input_schema: Some(schemas::edit_input()),
                    output_schema: None,
                    template: prompts::EDIT.into(),
                    tools: vec![tool],
                    force_tool_call: true,
                },
                PromptConfig::default(),
                deps.context.clone(),
                deps.adapter.clone(),
            )?)?;
        }

        registry.register(handlers::image::image_flow(
            deps.context.clone(),
            deps.adapter.clone(),
            deps.fetcher.clone(),
        )?)?;

        let image_template = Template::parse(prompts::IMAGE)
            .map_err(|e| CapabilityError::definition("image_prompt", e.to_string()))?;
        let classifier = registry
            .prompt(CLASSIFY_PROMPT)
            .ok_or_else(|| CapabilityError::definition(CLASSIFY_PROMPT, "classifier is not registered"))?;

        info!(capabilities = registry.len(), "Assistant ready");
        Ok(Self {
            store: deps.store,
            planner: IntentPlanner::new(classifier, settings.history_limit),
            registry,
            settings,
            image_template,
        })
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    /// Classify the request, run the matching handler, and report the
    /// outcome. Never fails.
    pub async fn assist(&self, request: AssistRequest) -> AssistResult {
        match AssertUnwindSafe(self.try_assist(&request)).catch_unwind().await {
            Ok(Ok(result)) => result,
            Ok(Err(failure)) => {
                warn!(code = %failure.code, message = %failure.message, "Request failed");
                failure.into()
            }
            Err(_) => {
                error!(project = %request.project_id, "Request handler panicked");
                AssistResult::error(ErrorCode::ExecutionFailed, "Something went wrong while handling that request.")
            }
        }
    }

    async fn try_assist(&self, request: &AssistRequest) -> Result<AssistResult, Failure> {
        let project = self
            .store
            .get_project(&request.project_id)
            .await?
            .ok_or_else(|| {
                Failure::new(ErrorCode::NotFound, format!("Project '{}' not found", request.project_id))
            })?;

        let descriptor = self.planner.plan(&project, request).await?;
        info!(action = %descriptor.kind(), project = %project.id, "Dispatching");

        let cx = HandlerContext {
            project: &project,
            store: self.store.as_ref(),
            registry: &self.registry,
            settings: &self.settings,
            image_template: &self.image_template,
            turns: recent(&request.prev_chats, self.settings.history_limit),
        };
        match descriptor {
            ActionDescriptor::DirectResponse(reply) => Ok(AssistResult::Message { content: reply.content }),
            ActionDescriptor::GenerateContent(payload) => handlers::generate::handle(&cx, payload).await,
            ActionDescriptor::UpdateContent(payload) => handlers::update::handle(&cx, payload).await,
            ActionDescriptor::GenerateImage(payload) => handlers::image::handle(&cx, payload).await,
        }
    }
}
