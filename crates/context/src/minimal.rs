//! Minimal projections for update flows and intent classification.
//!
//! Each lookup describes *what* is being edited and its parent chain, and
//! nothing more. A scene, for example, reports how many panels it has
//! rather than the panels themselves.

use panelforge_core::content::DialogueKind;
use panelforge_core::{ContentKind, Project};
use serde::Serialize;

use crate::{CharacterRef, ParentRef, speaker_name};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBrief {
    pub id: String,
    pub title: String,
    pub genre: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterBrief {
    pub id: String,
    pub name: String,
    pub role: String,
    pub description: String,
    pub appearance: String,
    pub personality: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterBrief {
    pub id: String,
    pub title: String,
    pub order: u32,
    pub summary: String,
    pub scene_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneBrief {
    pub id: String,
    pub title: String,
    pub order: u32,
    pub setting: String,
    pub description: String,
    pub panel_count: usize,
    pub chapter: ParentRef,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueLine {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelBrief {
    pub id: String,
    pub order: u32,
    pub description: String,
    pub shot: String,
    pub character_ids: Vec<String>,
    pub dialogues: Vec<DialogueLine>,
    pub scene: ParentRef,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueBrief {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    pub text: String,
    pub kind: DialogueKind,
    pub panel_id: String,
    pub scene: ParentRef,
}

/// The single entity an update is aimed at.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UpdateTarget {
    Character(CharacterBrief),
    Chapter(ChapterBrief),
    Scene(SceneBrief),
    Panel(PanelBrief),
    Dialogue(DialogueBrief),
}

/// What an update prompt sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContext {
    pub project: ProjectBrief,
    pub characters: Vec<CharacterRef>,
    pub content_type: ContentKind,
    pub target: UpdateTarget,
}

// ── Outline for the intent classifier ─────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelOutline {
    pub id: String,
    pub order: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneOutline {
    pub id: String,
    pub title: String,
    pub order: u32,
    pub panels: Vec<PanelOutline>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterOutline {
    pub id: String,
    pub title: String,
    pub order: u32,
    pub scenes: Vec<SceneOutline>,
}

/// IDs and titles of the whole tree, enough to resolve references like
/// "the second panel of the storm scene".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOutline {
    pub project: ProjectBrief,
    pub characters: Vec<CharacterRef>,
    pub chapters: Vec<ChapterOutline>,
}

/// Panel descriptions in the outline are cut to this many characters.
const OUTLINE_DESCRIPTION_CHARS: usize = 80;

#[derive(Debug, Clone, Copy)]
pub struct MinimalContext<'a> {
    project: &'a Project,
}

impl<'a> MinimalContext<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self { project }
    }

    pub fn project_brief(&self) -> ProjectBrief {
        ProjectBrief {
            id: self.project.id.clone(),
            title: self.project.title.clone(),
            genre: self.project.genre.clone(),
        }
    }

    pub fn character_refs(&self) -> Vec<CharacterRef> {
        self.project.characters.iter().map(CharacterRef::from).collect()
    }

    pub fn character_by_id(&self, id: &str) -> Option<CharacterBrief> {
        let c = self.project.character(id)?;
        Some(CharacterBrief {
            id: c.id.clone(),
            name: c.name.clone(),
            role: c.role.clone(),
            description: c.description.clone(),
            appearance: c.appearance.clone(),
            personality: c.personality.clone(),
        })
    }

    pub fn chapter_by_id(&self, id: &str) -> Option<ChapterBrief> {
        let ch = self.project.chapter(id)?;
        Some(ChapterBrief {
            id: ch.id.clone(),
            title: ch.title.clone(),
            order: ch.order,
            summary: ch.summary.clone(),
            scene_count: ch.scenes.len(),
        })
    }

    pub fn scene_by_id(&self, id: &str) -> Option<SceneBrief> {
        let (chapter, scene) = self.project.scene(id)?;
        Some(SceneBrief {
            id: scene.id.clone(),
            title: scene.title.clone(),
            order: scene.order,
            setting: scene.setting.clone(),
            description: scene.description.clone(),
            panel_count: scene.panels.len(),
            chapter: ParentRef {
                id: chapter.id.clone(),
                title: chapter.title.clone(),
            },
        })
    }

    pub fn panel_by_id(&self, id: &str) -> Option<PanelBrief> {
        let (_, scene, panel) = self.project.panel(id)?;
        Some(PanelBrief {
            id: panel.id.clone(),
            order: panel.order,
            description: panel.description.clone(),
            shot: panel.shot.clone(),
            character_ids: panel.character_ids.clone(),
            dialogues: panel
                .dialogues
                .iter()
                .map(|d| DialogueLine {
                    id: d.id.clone(),
                    speaker: speaker_name(self.project, d.speaker_id.as_deref()),
                    text: d.text.clone(),
                })
                .collect(),
            scene: ParentRef {
                id: scene.id.clone(),
                title: scene.title.clone(),
            },
        })
    }

    pub fn dialogue_by_id(&self, id: &str) -> Option<DialogueBrief> {
        let (scene, panel, d) = self.project.dialogue(id)?;
        Some(DialogueBrief {
            id: d.id.clone(),
            speaker_id: d.speaker_id.clone(),
            speaker: speaker_name(self.project, d.speaker_id.as_deref()),
            text: d.text.clone(),
            kind: d.kind,
            panel_id: panel.id.clone(),
            scene: ParentRef {
                id: scene.id.clone(),
                title: scene.title.clone(),
            },
        })
    }

    /// Context for editing one entity, or `None` if it does not exist.
    pub fn for_update(&self, kind: ContentKind, id: &str) -> Option<UpdateContext> {
        let target = match kind {
            ContentKind::Character => UpdateTarget::Character(self.character_by_id(id)?),
            ContentKind::Chapter => UpdateTarget::Chapter(self.chapter_by_id(id)?),
            ContentKind::Scene => UpdateTarget::Scene(self.scene_by_id(id)?),
            ContentKind::Panel => UpdateTarget::Panel(self.panel_by_id(id)?),
            ContentKind::Dialogue => UpdateTarget::Dialogue(self.dialogue_by_id(id)?),
            ContentKind::Project => return None,
        };
        Some(UpdateContext {
            project: self.project_brief(),
            characters: self.character_refs(),
            content_type: kind,
            target,
        })
    }

    pub fn outline(&self) -> ProjectOutline {
        ProjectOutline {
            project: self.project_brief(),
            characters: self.character_refs(),
            chapters: self
                .project
                .chapters
                .iter()
                .map(|ch| ChapterOutline {
                    id: ch.id.clone(),
                    title: ch.title.clone(),
                    order: ch.order,
                    scenes: ch
                        .scenes
                        .iter()
                        .map(|s| SceneOutline {
                            id: s.id.clone(),
                            title: s.title.clone(),
                            order: s.order,
                            panels: s
                                .panels
                                .iter()
                                .map(|p| PanelOutline {
                                    id: p.id.clone(),
                                    order: p.order,
                                    description: truncate(&p.description, OUTLINE_DESCRIPTION_CHARS),
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => format!("{}…", &text[..byte]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FullContext;
    use panelforge_store::fixtures::sample_project;

    #[test]
    fn scene_reports_panel_count_only() {
        let project = sample_project();
        let minimal = serde_json::to_value(MinimalContext::new(&project).scene_by_id("s1").unwrap()).unwrap();
        let full = serde_json::to_value(FullContext::new(&project).scene_by_id("s1").unwrap()).unwrap();

        assert_eq!(minimal["panelCount"], 2);
        assert!(minimal.get("panels").is_none());
        assert_eq!(full["panels"].as_array().unwrap().len(), 2);
        assert!(full["panels"][1]["dialogues"].as_array().unwrap().len() == 2);
    }

    #[test]
    fn character_refs_are_name_and_role() {
        let project = sample_project();
        let refs = serde_json::to_value(MinimalContext::new(&project).character_refs()).unwrap();
        let first = refs[0].as_object().unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first["name"], "Mira");
    }

    #[test]
    fn dialogue_lookup_resolves_speaker_and_parents() {
        let project = sample_project();
        let d = MinimalContext::new(&project).dialogue_by_id("d2").unwrap();
        assert_eq!(d.speaker.as_deref(), Some("Old Hal"));
        assert_eq!(d.panel_id, "pn2");
        assert_eq!(d.scene.id, "s1");
    }

    #[test]
    fn update_context_for_each_kind() {
        let project = sample_project();
        let minimal = MinimalContext::new(&project);
        for (kind, id) in [
            (ContentKind::Character, "c1"),
            (ContentKind::Chapter, "ch1"),
            (ContentKind::Scene, "s2"),
            (ContentKind::Panel, "pn3"),
            (ContentKind::Dialogue, "d4"),
        ] {
            let ctx = minimal.for_update(kind, id).unwrap_or_else(|| panic!("{kind} {id}"));
            assert_eq!(ctx.content_type, kind);
            assert_eq!(serde_json::to_value(&ctx.target).unwrap()["id"], id);
        }
        assert!(minimal.for_update(ContentKind::Scene, "pn1").is_none());
        assert!(minimal.for_update(ContentKind::Project, "p1").is_none());
    }

    #[test]
    fn outline_covers_tree_without_dialogue() {
        let project = sample_project();
        let outline = MinimalContext::new(&project).outline();
        assert_eq!(outline.chapters.len(), 2);
        assert_eq!(outline.chapters[0].scenes[0].panels[1].id, "pn2");
        assert!(!serde_json::to_string(&outline).unwrap().contains("Get away from the glass"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("ああああ", 2), "ああ…");
        assert_eq!(truncate("short", 10), "short");
    }
}
