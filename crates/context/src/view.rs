//! One-call projection selection, shared by the HTTP and CLI inspectors.

use std::str::FromStr;

use panelforge_core::{ContentKind, Project};
use serde::{Deserialize, Serialize};

use crate::full::SceneView;
use crate::minimal::SceneBrief;
use crate::{FullContext, GenerationContext, MinimalContext, ProjectOutline};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    #[default]
    Full,
    Minimal,
}

impl FromStr for ContextMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(ContextMode::Full),
            "minimal" => Ok(ContextMode::Minimal),
            other => Err(format!("unknown context mode '{other}' (expected full or minimal)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContextView {
    Project(GenerationContext),
    Scene(SceneView),
    SceneBrief(SceneBrief),
    Outline(ProjectOutline),
}

/// The whole project, or one scene when `scene` is given. `None` means
/// the scene does not exist.
pub fn context_view(project: &Project, mode: ContextMode, scene: Option<&str>) -> Option<ContextView> {
    match (mode, scene) {
        (ContextMode::Full, None) => FullContext::new(project)
            .for_generation(ContentKind::Chapter, None)
            .map(ContextView::Project),
        (ContextMode::Full, Some(id)) => FullContext::new(project).scene_by_id(id).map(ContextView::Scene),
        (ContextMode::Minimal, None) => Some(ContextView::Outline(MinimalContext::new(project).outline())),
        (ContextMode::Minimal, Some(id)) => MinimalContext::new(project)
            .scene_by_id(id)
            .map(ContextView::SceneBrief),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelforge_store::fixtures::sample_project;

    #[test]
    fn full_project_lists_every_chapter() {
        let project = sample_project();
        let Some(ContextView::Project(ctx)) = context_view(&project, ContextMode::Full, None) else {
            panic!("expected the project view");
        };
        assert_eq!(ctx.chapters.map(|c| c.len()), Some(2));
    }

    #[test]
    fn scene_views_differ_by_mode() {
        let project = sample_project();
        assert!(matches!(
            context_view(&project, ContextMode::Full, Some("s1")),
            Some(ContextView::Scene(_))
        ));
        assert!(matches!(
            context_view(&project, ContextMode::Minimal, Some("s1")),
            Some(ContextView::SceneBrief(_))
        ));
        assert_eq!(context_view(&project, ContextMode::Minimal, Some("s404")), None);
    }

    #[test]
    fn modes_parse_case_insensitively() {
        assert_eq!("Minimal".parse::<ContextMode>(), Ok(ContextMode::Minimal));
        assert!("brief".parse::<ContextMode>().is_err());
    }
}
