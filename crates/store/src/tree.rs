//! Synchronous operations over a set of projects, shared by both backends.

use panelforge_core::content::{
    Chapter, ChapterDraft, ChapterPatch, Character, CharacterDraft, CharacterPatch, Dialogue, DialoguePatch,
    Panel, PanelDraft, PanelPatch, Scene, SceneDraft, ScenePatch,
};
use panelforge_core::Project;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ProjectSet {
    #[serde(default)]
    pub projects: Vec<Project>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn next_order(orders: impl Iterator<Item = u32>) -> u32 {
    orders.max().map_or(1, |o| o + 1)
}

impl ProjectSet {
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.projects.iter().find_map(|p| p.character(id))
    }

    pub fn chapter(&self, id: &str) -> Option<&Chapter> {
        self.projects.iter().find_map(|p| p.chapter(id))
    }

    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.projects.iter().find_map(|p| p.scene(id).map(|(_, s)| s))
    }

    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.projects.iter().find_map(|p| p.panel(id).map(|(_, _, pn)| pn))
    }

    pub fn dialogue(&self, id: &str) -> Option<&Dialogue> {
        self.projects.iter().find_map(|p| p.dialogue(id).map(|(_, _, d)| d))
    }

    pub fn upsert_project(&mut self, project: Project) {
        match self.projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project,
            None => self.projects.push(project),
        }
    }

    pub fn update_character(&mut self, id: &str, patch: CharacterPatch) -> Option<Character> {
        let target = self.projects.iter_mut().find_map(|p| p.character_mut(id))?;
        patch.apply(target);
        Some(target.clone())
    }

    pub fn update_chapter(&mut self, id: &str, patch: ChapterPatch) -> Option<Chapter> {
        let target = self.projects.iter_mut().find_map(|p| p.chapter_mut(id))?;
        patch.apply(target);
        Some(target.clone())
    }

    pub fn update_scene(&mut self, id: &str, patch: ScenePatch) -> Option<Scene> {
        let target = self.projects.iter_mut().find_map(|p| p.scene_mut(id))?;
        patch.apply(target);
        Some(target.clone())
    }

    pub fn update_panel(&mut self, id: &str, patch: PanelPatch) -> Option<Panel> {
        let target = self.projects.iter_mut().find_map(|p| p.panel_mut(id))?;
        patch.apply(target);
        Some(target.clone())
    }

    pub fn update_dialogue(&mut self, id: &str, patch: DialoguePatch) -> Option<Dialogue> {
        let target = self.projects.iter_mut().find_map(|p| p.dialogue_mut(id))?;
        patch.apply(target);
        Some(target.clone())
    }

    pub fn create_character(&mut self, project_id: &str, draft: CharacterDraft) -> Option<Character> {
        let project = self.projects.iter_mut().find(|p| p.id == project_id)?;
        let character = Character {
            id: new_id(),
            name: draft.name,
            role: draft.role,
            description: draft.description,
            appearance: draft.appearance,
            personality: draft.personality,
            reference_image_url: None,
            image_url: None,
        };
        project.characters.push(character.clone());
        Some(character)
    }

    pub fn create_chapter(&mut self, project_id: &str, draft: ChapterDraft) -> Option<Chapter> {
        let project = self.projects.iter_mut().find(|p| p.id == project_id)?;
        let chapter = Chapter {
            id: new_id(),
            title: draft.title,
            order: next_order(project.chapters.iter().map(|c| c.order)),
            summary: draft.summary,
            scenes: Vec::new(),
        };
        project.chapters.push(chapter.clone());
        Some(chapter)
    }

    pub fn create_scene(&mut self, chapter_id: &str, draft: SceneDraft) -> Option<Scene> {
        let chapter = self.projects.iter_mut().find_map(|p| p.chapter_mut(chapter_id))?;
        let scene = Scene {
            id: new_id(),
            title: draft.title,
            order: next_order(chapter.scenes.iter().map(|s| s.order)),
            setting: draft.setting,
            description: draft.description,
            panels: Vec::new(),
        };
        chapter.scenes.push(scene.clone());
        Some(scene)
    }

    pub fn create_panel(&mut self, scene_id: &str, draft: PanelDraft) -> Option<Panel> {
        let scene = self.projects.iter_mut().find_map(|p| p.scene_mut(scene_id))?;
        let panel = Panel {
            id: new_id(),
            order: next_order(scene.panels.iter().map(|p| p.order)),
            description: draft.description,
            shot: draft.shot,
            character_ids: draft.character_ids,
            image_url: None,
            dialogues: draft
                .dialogues
                .into_iter()
                .map(|d| Dialogue {
                    id: new_id(),
                    speaker_id: d.speaker_id,
                    text: d.text,
                    kind: d.kind,
                })
                .collect(),
        };
        scene.panels.push(panel.clone());
        Some(panel)
    }
}
