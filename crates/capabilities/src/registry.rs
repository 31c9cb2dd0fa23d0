//! Name-indexed registry of capabilities.

use std::collections::HashMap;
use std::sync::Arc;

use panelforge_core::{CapabilityError, Tool};

use crate::{FlowCapability, PromptCapability, ToolCapability};

#[derive(Debug, Clone)]
pub enum Capability {
    Tool(Arc<ToolCapability>),
    Prompt(Arc<PromptCapability>),
    Flow(Arc<FlowCapability>),
}

impl Capability {
    pub fn name(&self) -> &str {
        match self {
            Capability::Tool(t) => t.name(),
            Capability::Prompt(p) => p.name(),
            Capability::Flow(f) => f.name(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Capability::Tool(_) => "tool",
            Capability::Prompt(_) => "prompt",
            Capability::Flow(_) => "flow",
        }
    }
}

impl From<ToolCapability> for Capability {
    fn from(tool: ToolCapability) -> Self {
        Capability::Tool(Arc::new(tool))
    }
}

impl From<PromptCapability> for Capability {
    fn from(prompt: PromptCapability) -> Self {
        Capability::Prompt(Arc::new(prompt))
    }
}

impl From<FlowCapability> for Capability {
    fn from(flow: FlowCapability) -> Self {
        Capability::Flow(Arc::new(flow))
    }
}

/// Capabilities registered at startup, looked up by name.
///
/// A name can be registered once; a second registration is a
/// definition error and leaves the first in place.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    entries: HashMap<String, Capability>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, capability: impl Into<Capability>) -> Result<(), CapabilityError> {
        let capability = capability.into();
        let name = capability.name().to_string();
        if self.entries.contains_key(&name) {
            return Err(CapabilityError::definition(name, "a capability with this name is already registered"));
        }
        tracing::debug!(capability = %name, "Registered capability");
        self.entries.insert(name, capability);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.entries.get(name)
    }

    pub fn tool(&self, name: &str) -> Option<Arc<ToolCapability>> {
        match self.entries.get(name)? {
            Capability::Tool(t) => Some(t.clone()),
            _ => None,
        }
    }

    /// A tool as the model adapter sees it.
    pub fn tool_handle(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tool(name).map(|t| t as Arc<dyn Tool>)
    }

    pub fn prompt(&self, name: &str) -> Option<Arc<PromptCapability>> {
        match self.entries.get(name)? {
            Capability::Prompt(p) => Some(p.clone()),
            _ => None,
        }
    }

    pub fn flow(&self, name: &str) -> Option<Arc<FlowCapability>> {
        match self.entries.get(name)? {
            Capability::Flow(f) => Some(f.clone()),
            _ => None,
        }
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
