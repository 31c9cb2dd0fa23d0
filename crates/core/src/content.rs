//! The manga content tree and the store contract over it.
//!
//! ```text
//! Project ─┬─ Characters
//!          └─ Chapters ── Scenes ── Panels ── Dialogues
//! ```
//!
//! The tree is owned by an external store. The runtime reads whole
//! projects for projection and writes through per-entity create/update
//! operations. A missing entity is `Ok(None)`, never an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::StoreError;

/// The entity kinds of the content tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Project,
    Character,
    Chapter,
    Scene,
    Panel,
    Dialogue,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Project => "project",
            ContentKind::Character => "character",
            ContentKind::Chapter => "chapter",
            ContentKind::Scene => "scene",
            ContentKind::Panel => "panel",
            ContentKind::Dialogue => "dialogue",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "project" => Ok(ContentKind::Project),
            "character" => Ok(ContentKind::Character),
            "chapter" => Ok(ContentKind::Chapter),
            "scene" => Ok(ContentKind::Scene),
            "panel" => Ok(ContentKind::Panel),
            "dialogue" => Ok(ContentKind::Dialogue),
            other => Err(format!("unknown content kind '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub genre: String,
    pub art_style: String,
    pub characters: Vec<Character>,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub role: String,
    pub description: String,
    pub appearance: String,
    pub personality: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub order: u32,
    pub summary: String,
    pub scenes: Vec<Scene>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scene {
    pub id: String,
    pub title: String,
    pub order: u32,
    pub setting: String,
    pub description: String,
    pub panels: Vec<Panel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Panel {
    pub id: String,
    pub order: u32,
    pub description: String,
    /// Camera framing, e.g. "close-up", "wide"
    pub shot: String,
    /// Characters drawn in the panel (speakers are implied)
    pub character_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub dialogues: Vec<Dialogue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dialogue {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_id: Option<String>,
    pub text: String,
    pub kind: DialogueKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogueKind {
    #[default]
    Speech,
    Thought,
    Narration,
    Sfx,
}

// ── Tree walks ────────────────────────────────────────────────────────────

impl Project {
    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn chapter(&self, id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    /// Find a scene and the chapter that owns it.
    pub fn scene(&self, id: &str) -> Option<(&Chapter, &Scene)> {
        self.chapters.iter().find_map(|chapter| {
            chapter
                .scenes
                .iter()
                .find(|s| s.id == id)
                .map(|scene| (chapter, scene))
        })
    }

    /// Find a panel with its owning chapter and scene.
    pub fn panel(&self, id: &str) -> Option<(&Chapter, &Scene, &Panel)> {
        self.chapters.iter().find_map(|chapter| {
            chapter.scenes.iter().find_map(|scene| {
                scene
                    .panels
                    .iter()
                    .find(|p| p.id == id)
                    .map(|panel| (chapter, scene, panel))
            })
        })
    }

    /// Find a dialogue with its owning scene and panel.
    pub fn dialogue(&self, id: &str) -> Option<(&Scene, &Panel, &Dialogue)> {
        self.chapters.iter().find_map(|chapter| {
            chapter.scenes.iter().find_map(|scene| {
                scene.panels.iter().find_map(|panel| {
                    panel
                        .dialogues
                        .iter()
                        .find(|d| d.id == id)
                        .map(|dialogue| (scene, panel, dialogue))
                })
            })
        })
    }

    /// Does any entity of `kind` carry `id`?
    pub fn contains(&self, kind: ContentKind, id: &str) -> bool {
        match kind {
            ContentKind::Project => self.id == id,
            ContentKind::Character => self.character(id).is_some(),
            ContentKind::Chapter => self.chapter(id).is_some(),
            ContentKind::Scene => self.scene(id).is_some(),
            ContentKind::Panel => self.panel(id).is_some(),
            ContentKind::Dialogue => self.dialogue(id).is_some(),
        }
    }

    pub fn character_mut(&mut self, id: &str) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    pub fn chapter_mut(&mut self, id: &str) -> Option<&mut Chapter> {
        self.chapters.iter_mut().find(|c| c.id == id)
    }

    pub fn scene_mut(&mut self, id: &str) -> Option<&mut Scene> {
        self.chapters
            .iter_mut()
            .flat_map(|c| c.scenes.iter_mut())
            .find(|s| s.id == id)
    }

    pub fn panel_mut(&mut self, id: &str) -> Option<&mut Panel> {
        self.chapters
            .iter_mut()
            .flat_map(|c| c.scenes.iter_mut())
            .flat_map(|s| s.panels.iter_mut())
            .find(|p| p.id == id)
    }

    pub fn dialogue_mut(&mut self, id: &str) -> Option<&mut Dialogue> {
        self.chapters
            .iter_mut()
            .flat_map(|c| c.scenes.iter_mut())
            .flat_map(|s| s.panels.iter_mut())
            .flat_map(|p| p.dialogues.iter_mut())
            .find(|d| d.id == id)
    }
}

impl Panel {
    /// Character IDs drawn in or speaking in this panel, first appearance order.
    pub fn appearing_character_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        let speakers = self.dialogues.iter().filter_map(|d| d.speaker_id.as_deref());
        for id in self.character_ids.iter().map(String::as_str).chain(speakers) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

// ── Patches (partial updates) ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub description: Option<String>,
    pub appearance: Option<String>,
    pub personality: Option<String>,
    pub reference_image_url: Option<String>,
    pub image_url: Option<String>,
}

impl CharacterPatch {
    pub fn apply(self, target: &mut Character) {
        if let Some(v) = self.name { target.name = v; }
        if let Some(v) = self.role { target.role = v; }
        if let Some(v) = self.description { target.description = v; }
        if let Some(v) = self.appearance { target.appearance = v; }
        if let Some(v) = self.personality { target.personality = v; }
        if self.reference_image_url.is_some() { target.reference_image_url = self.reference_image_url; }
        if self.image_url.is_some() { target.image_url = self.image_url; }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChapterPatch {
    pub title: Option<String>,
    pub order: Option<u32>,
    pub summary: Option<String>,
}

impl ChapterPatch {
    pub fn apply(self, target: &mut Chapter) {
        if let Some(v) = self.title { target.title = v; }
        if let Some(v) = self.order { target.order = v; }
        if let Some(v) = self.summary { target.summary = v; }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenePatch {
    pub title: Option<String>,
    pub order: Option<u32>,
    pub setting: Option<String>,
    pub description: Option<String>,
}

impl ScenePatch {
    pub fn apply(self, target: &mut Scene) {
        if let Some(v) = self.title { target.title = v; }
        if let Some(v) = self.order { target.order = v; }
        if let Some(v) = self.setting { target.setting = v; }
        if let Some(v) = self.description { target.description = v; }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelPatch {
    pub order: Option<u32>,
    pub description: Option<String>,
    pub shot: Option<String>,
    pub character_ids: Option<Vec<String>>,
    pub image_url: Option<String>,
}

impl PanelPatch {
    pub fn apply(self, target: &mut Panel) {
        if let Some(v) = self.order { target.order = v; }
        if let Some(v) = self.description { target.description = v; }
        if let Some(v) = self.shot { target.shot = v; }
        if let Some(v) = self.character_ids { target.character_ids = v; }
        if self.image_url.is_some() { target.image_url = self.image_url; }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DialoguePatch {
    pub speaker_id: Option<String>,
    pub text: Option<String>,
    pub kind: Option<DialogueKind>,
}

impl DialoguePatch {
    pub fn apply(self, target: &mut Dialogue) {
        if self.speaker_id.is_some() { target.speaker_id = self.speaker_id; }
        if let Some(v) = self.text { target.text = v; }
        if let Some(v) = self.kind { target.kind = v; }
    }
}

// ── Drafts (creation payloads) ────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterDraft {
    pub name: String,
    pub role: String,
    pub description: String,
    pub appearance: String,
    pub personality: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChapterDraft {
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneDraft {
    pub title: String,
    pub setting: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelDraft {
    pub description: String,
    pub shot: String,
    pub character_ids: Vec<String>,
    pub dialogues: Vec<DialogueDraft>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DialogueDraft {
    pub speaker_id: Option<String>,
    pub text: String,
    pub kind: DialogueKind,
}

// ── Store contract ────────────────────────────────────────────────────────

/// The external content-tree store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// A human-readable name for this backend (e.g., "memory", "file").
    fn name(&self) -> &str;

    /// Load a project with all of its relations.
    async fn get_project(&self, id: &str) -> Result<Option<Project>, StoreError>;

    async fn get_character(&self, id: &str) -> Result<Option<Character>, StoreError>;
    async fn get_chapter(&self, id: &str) -> Result<Option<Chapter>, StoreError>;
    async fn get_scene(&self, id: &str) -> Result<Option<Scene>, StoreError>;
    async fn get_panel(&self, id: &str) -> Result<Option<Panel>, StoreError>;
    async fn get_dialogue(&self, id: &str) -> Result<Option<Dialogue>, StoreError>;

    async fn update_character(&self, id: &str, patch: CharacterPatch) -> Result<Option<Character>, StoreError>;
    async fn update_chapter(&self, id: &str, patch: ChapterPatch) -> Result<Option<Chapter>, StoreError>;
    async fn update_scene(&self, id: &str, patch: ScenePatch) -> Result<Option<Scene>, StoreError>;
    async fn update_panel(&self, id: &str, patch: PanelPatch) -> Result<Option<Panel>, StoreError>;
    async fn update_dialogue(&self, id: &str, patch: DialoguePatch) -> Result<Option<Dialogue>, StoreError>;

    /// Create under a parent; `Ok(None)` when the parent does not exist.
    async fn create_character(&self, project_id: &str, draft: CharacterDraft) -> Result<Option<Character>, StoreError>;
    async fn create_chapter(&self, project_id: &str, draft: ChapterDraft) -> Result<Option<Chapter>, StoreError>;
    async fn create_scene(&self, chapter_id: &str, draft: SceneDraft) -> Result<Option<Scene>, StoreError>;
    async fn create_panel(&self, scene_id: &str, draft: PanelDraft) -> Result<Option<Panel>, StoreError>;

    /// Fetch any single entity as JSON.
    async fn get_entity(
        &self,
        kind: ContentKind,
        id: &str,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        fn to_json<T: Serialize>(v: Option<T>) -> Result<Option<serde_json::Value>, StoreError> {
            v.map(|e| serde_json::to_value(e).map_err(|e| StoreError::Storage(e.to_string())))
                .transpose()
        }
        match kind {
            ContentKind::Project => to_json(self.get_project(id).await?),
            ContentKind::Character => to_json(self.get_character(id).await?),
            ContentKind::Chapter => to_json(self.get_chapter(id).await?),
            ContentKind::Scene => to_json(self.get_scene(id).await?),
            ContentKind::Panel => to_json(self.get_panel(id).await?),
            ContentKind::Dialogue => to_json(self.get_dialogue(id).await?),
        }
    }
}
