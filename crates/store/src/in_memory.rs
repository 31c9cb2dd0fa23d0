//! In-memory content store.

use std::sync::Arc;

use async_trait::async_trait;
use panelforge_core::content::{
    Chapter, ChapterDraft, ChapterPatch, Character, CharacterDraft, CharacterPatch, Dialogue, DialoguePatch,
    Panel, PanelDraft, PanelPatch, Scene, SceneDraft, ScenePatch,
};
use panelforge_core::error::StoreError;
use panelforge_core::{ContentStore, Project};
use tokio::sync::RwLock;
use tracing::debug;

use crate::tree::ProjectSet;

/// Projects held in a `RwLock`; nothing survives the process.
#[derive(Clone, Default)]
pub struct InMemoryContentStore {
    pub(crate) set: Arc<RwLock<ProjectSet>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            set: Arc::new(RwLock::new(ProjectSet { projects })),
        }
    }

    /// Insert or replace a project.
    pub async fn put_project(&self, project: Project) {
        debug!(project = %project.id, "Storing project");
        self.set.write().await.upsert_project(project);
    }

    pub async fn project_ids(&self) -> Vec<String> {
        self.set.read().await.projects.iter().map(|p| p.id.clone()).collect()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>, StoreError> {
        Ok(self.set.read().await.project(id).cloned())
    }

    async fn get_character(&self, id: &str) -> Result<Option<Character>, StoreError> {
        Ok(self.set.read().await.character(id).cloned())
    }

    async fn get_chapter(&self, id: &str) -> Result<Option<Chapter>, StoreError> {
        Ok(self.set.read().await.chapter(id).cloned())
    }

    async fn get_scene(&self, id: &str) -> Result<Option<Scene>, StoreError> {
        Ok(self.set.read().await.scene(id).cloned())
    }

    async fn get_panel(&self, id: &str) -> Result<Option<Panel>, StoreError> {
        Ok(self.set.read().await.panel(id).cloned())
    }

    async fn get_dialogue(&self, id: &str) -> Result<Option<Dialogue>, StoreError> {
        Ok(self.set.read().await.dialogue(id).cloned())
    }

    async fn update_character(&self, id: &str, patch: CharacterPatch) -> Result<Option<Character>, StoreError> {
        Ok(self.set.write().await.update_character(id, patch))
    }

    async fn update_chapter(&self, id: &str, patch: ChapterPatch) -> Result<Option<Chapter>, StoreError> {
        Ok(self.set.write().await.update_chapter(id, patch))
    }

    async fn update_scene(&self, id: &str, patch: ScenePatch) -> Result<Option<Scene>, StoreError> {
        Ok(self.set.write().await.update_scene(id, patch))
    }

    async fn update_panel(&self, id: &str, patch: PanelPatch) -> Result<Option<Panel>, StoreError> {
        Ok(self.set.write().await.update_panel(id, patch))
    }

    async fn update_dialogue(&self, id: &str, patch: DialoguePatch) -> Result<Option<Dialogue>, StoreError> {
        Ok(self.set.write().await.update_dialogue(id, patch))
    }

    async fn create_character(&self, project_id: &str, draft: CharacterDraft) -> Result<Option<Character>, StoreError> {
        Ok(self.set.write().await.create_character(project_id, draft))
    }

    async fn create_chapter(&self, project_id: &str, draft: ChapterDraft) -> Result<Option<Chapter>, StoreError> {
        Ok(self.set.write().await.create_chapter(project_id, draft))
    }

    async fn create_scene(&self, chapter_id: &str, draft: SceneDraft) -> Result<Option<Scene>, StoreError> {
        Ok(self.set.write().await.create_scene(chapter_id, draft))
    }

    async fn create_panel(&self, scene_id: &str, draft: PanelDraft) -> Result<Option<Panel>, StoreError> {
        Ok(self.set.write().await.create_panel(scene_id, draft))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_project;
    use panelforge_core::ContentKind;
    use panelforge_core::content::{DialogueDraft, DialogueKind};

    fn store() -> InMemoryContentStore {
        InMemoryContentStore::with_projects(vec![sample_project()])
    }

    #[tokio::test]
    async fn reads_nested_entities() {
        let store = store();
        assert_eq!(store.get_project("p1").await.unwrap().unwrap().title, "Tidebound");
        assert_eq!(store.get_scene("s2").await.unwrap().unwrap().title, "Wreckage");
        assert_eq!(store.get_dialogue("d3").await.unwrap().unwrap().kind, DialogueKind::Sfx);
        assert!(store.get_panel("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn patch_only_touches_given_fields() {
        let store = store();
        let updated = store
            .update_scene("s1", ScenePatch { title: Some("Storm Warning".into()), ..Default::default() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Storm Warning");
        assert_eq!(updated.setting, "Lighthouse lamp room");
        assert_eq!(updated.panels.len(), 2);

        assert!(store.update_scene("nope", ScenePatch::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_appends_with_next_order() {
        let store = store();
        let panel = store
            .create_panel(
                "s1",
                PanelDraft {
                    description: "Lightning splits the sky".into(),
                    shot: "extreme wide".into(),
                    character_ids: vec![],
                    dialogues: vec![DialogueDraft { speaker_id: None, text: "KRAKOOM".into(), kind: DialogueKind::Sfx }],
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(panel.order, 3);
        assert_eq!(panel.dialogues.len(), 1);
        assert!(!panel.dialogues[0].id.is_empty());

        let scene = store.get_scene("s1").await.unwrap().unwrap();
        assert_eq!(scene.panels.len(), 3);

        assert!(store.create_scene("missing-chapter", SceneDraft::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_entity_serializes_any_kind() {
        let store = store();
        let value = store.get_entity(ContentKind::Character, "c2").await.unwrap().unwrap();
        assert_eq!(value["name"], "Old Hal");
        assert!(store.get_entity(ContentKind::Chapter, "c2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_project_replaces_by_id() {
        let store = store();
        let mut project = sample_project();
        project.title = "Renamed".into();
        store.put_project(project).await;
        assert_eq!(store.project_ids().await, vec!["p1"]);
        assert_eq!(store.get_project("p1").await.unwrap().unwrap().title, "Renamed");
    }
}
