//! # PanelForge Context
//!
//! Read-only projections of a [`Project`](panelforge_core::Project) tree,
//! built per request and thrown away afterwards.
//!
//! - [`FullContext`]: everything about the target and its surroundings,
//!   used when generating new content.
//! - [`MinimalContext`]: just enough to identify what is being edited and
//!   its parent chain, used for updates and for intent classification.
//! - [`image`]: what an image prompt needs to know about a panel or a
//!   character.
//! - [`view`]: picks a projection by mode, for inspection tools.
//!
//! All lookups scan the tree linearly and return `None` when nothing
//! matches.

pub mod full;
pub mod image;
pub mod minimal;
pub mod view;

pub use full::{FullContext, GenerationContext};
pub use image::{ImageCharacter, ImageSubject, image_subject};
pub use minimal::{MinimalContext, ProjectOutline, UpdateContext};
pub use view::{ContextMode, ContextView, context_view};

use serde::Serialize;

/// A pointer to a parent entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRef {
    pub id: String,
    pub title: String,
}

/// A character by name only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRef {
    pub id: String,
    pub name: String,
    pub role: String,
}

impl From<&panelforge_core::content::Character> for CharacterRef {
    fn from(c: &panelforge_core::content::Character) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            role: c.role.clone(),
        }
    }
}

fn speaker_name(project: &panelforge_core::Project, speaker_id: Option<&str>) -> Option<String> {
    speaker_id
        .and_then(|id| project.character(id))
        .map(|c| c.name.clone())
}
