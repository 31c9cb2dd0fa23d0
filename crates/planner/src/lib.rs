//! # PanelForge Planner
//!
//! Intent planning and dispatch for the manga assistant.
//!
//! A request goes through two steps:
//!
//! 1. **Classify**: the `classify_intent` prompt reads the request, a
//!    trimmed project outline, the selected node and recent chat, and
//!    produces an [`ActionDescriptor`](panelforge_core::ActionDescriptor).
//!    Guards then fill in IDs from the selection or turn the action into a
//!    clarifying question.
//! 2. **Dispatch**: exactly one handler runs.
//!    - `directResponse` returns the classifier's text.
//!    - `generateContent` calls `generate_<kind>` with a full projection.
//!    - `updateContent` calls `edit_<kind>`, which must call the
//!      `update_<kind>` tool, with a minimal projection.
//!    - `generateImage` runs the `generate_image` flow.
//!
//! [`Assistant::assist`] is the boundary: everything, errors included,
//! comes back as an [`AssistResult`].

pub mod assistant;
mod handlers;
mod planner;
pub mod prompts;
pub mod result;
pub mod schemas;

#[cfg(test)]
pub(crate) mod test_support;

pub use assistant::{Assistant, AssistantDeps, AssistantSettings};
pub use planner::apply_guards;
pub use result::{AssistRequest, AssistResult, ErrorCode};

use panelforge_core::ContentKind;

pub const CLASSIFY_PROMPT: &str = "classify_intent";
pub const IMAGE_FLOW: &str = "generate_image";

/// Kinds with a `generate_<kind>` prompt.
pub const GENERATABLE_KINDS: [ContentKind; 4] = [
    ContentKind::Character,
    ContentKind::Chapter,
    ContentKind::Scene,
    ContentKind::Panel,
];

pub fn generation_prompt(kind: ContentKind) -> String {
    format!("generate_{kind}")
}

pub fn edit_prompt(kind: ContentKind) -> String {
    format!("edit_{kind}")
}
