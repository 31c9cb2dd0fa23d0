//! Content tools for PanelForge.
//!
//! Tools let the model edit the content tree mid-generation. Each one is
//! an ordinary [`ToolCapability`], so its arguments are schema-checked and
//! its failures come back to the model as text.

pub mod update;

use std::sync::Arc;

use panelforge_capabilities::{CapabilityRegistry, ToolCapability};
use panelforge_core::{CapabilityError, ContentKind, ContentStore, ContextStore};

pub use update::{tool_name, update_tool};

/// Kinds with an `update_<kind>` tool.
pub const UPDATABLE_KINDS: [ContentKind; 5] = [
    ContentKind::Character,
    ContentKind::Chapter,
    ContentKind::Scene,
    ContentKind::Panel,
    ContentKind::Dialogue,
];

/// Build every update tool.
pub fn content_tools(
    store: Arc<dyn ContentStore>,
    context: Arc<ContextStore>,
) -> Result<Vec<ToolCapability>, CapabilityError> {
    UPDATABLE_KINDS
        .iter()
        .map(|&kind| update_tool(kind, store.clone(), context.clone()))
        .collect()
}

/// Register every update tool under its `update_<kind>` name.
pub fn register_content_tools(
    registry: &mut CapabilityRegistry,
    store: Arc<dyn ContentStore>,
    context: Arc<ContextStore>,
) -> Result<(), CapabilityError> {
    for tool in content_tools(store, context)? {
        registry.register(tool)?;
    }
    Ok(())
}
