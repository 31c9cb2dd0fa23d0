//! Full projections for creation flows.

use panelforge_core::content::{Chapter, Character, DialogueKind, Panel, Scene};
use panelforge_core::{ContentKind, Project};
use serde::Serialize;

use crate::{CharacterRef, ParentRef, speaker_name};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub genre: String,
    pub art_style: String,
    pub chapter_count: usize,
    pub character_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSummary {
    pub id: String,
    pub title: String,
    pub order: u32,
    pub setting: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterView {
    pub id: String,
    pub title: String,
    pub order: u32,
    pub summary: String,
    pub scenes: Vec<SceneSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueView {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_name: Option<String>,
    pub text: String,
    pub kind: DialogueKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub id: String,
    pub order: u32,
    pub description: String,
    pub shot: String,
    pub characters: Vec<CharacterRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub dialogues: Vec<DialogueView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneView {
    pub id: String,
    pub title: String,
    pub order: u32,
    pub setting: String,
    pub description: String,
    pub chapter: ParentRef,
    pub panels: Vec<PanelView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelContext {
    pub chapter: ParentRef,
    pub scene: ParentRef,
    pub panel: PanelView,
}

/// Everything a generation prompt sees. Which subtree is present depends
/// on the content type being generated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContext {
    pub project: ProjectSummary,
    pub characters: Vec<Character>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapters: Option<Vec<ChapterView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<ChapterView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<SceneView>,
}

/// Rich projections over one project.
#[derive(Debug, Clone, Copy)]
pub struct FullContext<'a> {
    project: &'a Project,
}

impl<'a> FullContext<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self { project }
    }

    pub fn project_summary(&self) -> ProjectSummary {
        let p = self.project;
        ProjectSummary {
            id: p.id.clone(),
            title: p.title.clone(),
            description: p.description.clone(),
            genre: p.genre.clone(),
            art_style: p.art_style.clone(),
            chapter_count: p.chapters.len(),
            character_count: p.characters.len(),
        }
    }

    pub fn characters(&self) -> Vec<Character> {
        self.project.characters.clone()
    }

    pub fn chapters(&self) -> Vec<ChapterView> {
        self.project.chapters.iter().map(chapter_view).collect()
    }

    pub fn chapter_by_id(&self, id: &str) -> Option<ChapterView> {
        self.project.chapter(id).map(chapter_view)
    }

    pub fn scene_by_id(&self, id: &str) -> Option<SceneView> {
        let (chapter, scene) = self.project.scene(id)?;
        Some(SceneView {
            id: scene.id.clone(),
            title: scene.title.clone(),
            order: scene.order,
            setting: scene.setting.clone(),
            description: scene.description.clone(),
            chapter: ParentRef {
                id: chapter.id.clone(),
                title: chapter.title.clone(),
            },
            panels: scene.panels.iter().map(|p| self.panel_view(p)).collect(),
        })
    }

    pub fn panel_by_id(&self, id: &str) -> Option<PanelContext> {
        let (chapter, scene, panel) = self.project.panel(id)?;
        Some(PanelContext {
            chapter: ParentRef {
                id: chapter.id.clone(),
                title: chapter.title.clone(),
            },
            scene: ParentRef {
                id: scene.id.clone(),
                title: scene.title.clone(),
            },
            panel: self.panel_view(panel),
        })
    }

    /// Context for generating `kind` under `parent_id`.
    ///
    /// Characters and chapters hang off the project, scenes off a chapter,
    /// panels off a scene. Returns `None` when the parent cannot be found.
    pub fn for_generation(&self, kind: ContentKind, parent_id: Option<&str>) -> Option<GenerationContext> {
        let mut ctx = GenerationContext {
            project: self.project_summary(),
            characters: self.characters(),
            chapters: None,
            chapter: None,
            scene: None,
        };
        match kind {
            ContentKind::Character => {}
            ContentKind::Chapter => ctx.chapters = Some(self.chapters()),
            ContentKind::Scene => ctx.chapter = Some(self.chapter_by_id(parent_id?)?),
            ContentKind::Panel => ctx.scene = Some(self.scene_by_id(parent_id?)?),
            ContentKind::Project | ContentKind::Dialogue => return None,
        }
        Some(ctx)
    }

    fn panel_view(&self, panel: &Panel) -> PanelView {
        PanelView {
            id: panel.id.clone(),
            order: panel.order,
            description: panel.description.clone(),
            shot: panel.shot.clone(),
            characters: panel
                .appearing_character_ids()
                .into_iter()
                .filter_map(|id| self.project.character(id))
                .map(CharacterRef::from)
                .collect(),
            image_url: panel.image_url.clone(),
            dialogues: panel
                .dialogues
                .iter()
                .map(|d| DialogueView {
                    id: d.id.clone(),
                    speaker_id: d.speaker_id.clone(),
                    speaker_name: speaker_name(self.project, d.speaker_id.as_deref()),
                    text: d.text.clone(),
                    kind: d.kind,
                })
                .collect(),
        }
    }
}

fn chapter_view(chapter: &Chapter) -> ChapterView {
    ChapterView {
        id: chapter.id.clone(),
        title: chapter.title.clone(),
        order: chapter.order,
        summary: chapter.summary.clone(),
        scenes: chapter.scenes.iter().map(scene_summary).collect(),
    }
}

fn scene_summary(scene: &Scene) -> SceneSummary {
    SceneSummary {
        id: scene.id.clone(),
        title: scene.title.clone(),
        order: scene.order,
        setting: scene.setting.clone(),
        description: scene.description.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelforge_store::fixtures::sample_project;

    #[test]
    fn summary_counts() {
        let project = sample_project();
        let summary = FullContext::new(&project).project_summary();
        assert_eq!(summary.title, "Tidebound");
        assert_eq!(summary.chapter_count, 2);
        assert_eq!(summary.character_count, 3);
    }

    #[test]
    fn scene_includes_panels_and_named_speakers() {
        let project = sample_project();
        let scene = FullContext::new(&project).scene_by_id("s1").unwrap();
        assert_eq!(scene.chapter.id, "ch1");
        assert_eq!(scene.panels.len(), 2);

        let second = &scene.panels[1];
        assert_eq!(second.dialogues.len(), 2);
        assert_eq!(second.dialogues[0].speaker_name.as_deref(), Some("Old Hal"));
        assert_eq!(second.dialogues[1].speaker_name, None);
    }

    #[test]
    fn panel_lookup_carries_parent_chain() {
        let project = sample_project();
        let ctx = FullContext::new(&project).panel_by_id("pn1").unwrap();
        assert_eq!(ctx.scene.id, "s1");
        assert_eq!(ctx.chapter.id, "ch1");
        assert_eq!(ctx.panel.characters[0].name, "Mira");
    }

    #[test]
    fn missing_ids_are_none() {
        let project = sample_project();
        let full = FullContext::new(&project);
        assert!(full.chapter_by_id("nope").is_none());
        assert!(full.scene_by_id("nope").is_none());
        assert!(full.panel_by_id("nope").is_none());
    }

    #[test]
    fn generation_context_depends_on_kind() {
        let project = sample_project();
        let full = FullContext::new(&project);

        let chars = full.for_generation(ContentKind::Character, None).unwrap();
        assert!(chars.chapters.is_none() && chars.scene.is_none());

        let chapters = full.for_generation(ContentKind::Chapter, None).unwrap();
        assert_eq!(chapters.chapters.unwrap().len(), 2);

        let scene = full.for_generation(ContentKind::Scene, Some("ch1")).unwrap();
        assert_eq!(scene.chapter.unwrap().scenes.len(), 2);

        let panel = full.for_generation(ContentKind::Panel, Some("s1")).unwrap();
        assert_eq!(panel.scene.unwrap().panels.len(), 2);

        assert!(full.for_generation(ContentKind::Panel, None).is_none());
        assert!(full.for_generation(ContentKind::Scene, Some("missing")).is_none());
        assert!(full.for_generation(ContentKind::Dialogue, Some("pn1")).is_none());
    }
}
