//! One handler per action. Each returns a result or a [`Failure`]; the
//! assistant turns failures into error results.

pub(crate) mod generate;
pub(crate) mod image;
pub(crate) mod update;

use panelforge_capabilities::CapabilityRegistry;
use panelforge_core::{ChatTurn, ContentStore, ContextMap, Message, Project};
use panelforge_template::Template;
use serde_json::json;

use crate::assistant::AssistantSettings;

/// Everything a handler may touch while serving one request.
pub(crate) struct HandlerContext<'a> {
    pub project: &'a Project,
    pub store: &'a dyn ContentStore,
    pub registry: &'a CapabilityRegistry,
    pub settings: &'a AssistantSettings,
    pub image_template: &'a Template,
    /// Recent chat turns, oldest first
    pub turns: &'a [ChatTurn],
}

impl HandlerContext<'_> {
    /// Call context for capabilities: scopes tools to the current project.
    pub fn call_context(&self) -> ContextMap {
        let mut context = ContextMap::new();
        context.insert("projectId".into(), json!(self.project.id));
        context
    }

    pub fn history(&self) -> Vec<Message> {
        self.turns.iter().cloned().map(Message::from).collect()
    }
}
