//! JSON-file content store.
//!
//! The whole file is read once on open and rewritten after each
//! successful mutation. Reads are served from memory.
//!
//! Storage location: `~/.panelforge/projects.json` by default.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use panelforge_core::content::{
    Chapter, ChapterDraft, ChapterPatch, Character, CharacterDraft, CharacterPatch, Dialogue, DialoguePatch,
    Panel, PanelDraft, PanelPatch, Scene, SceneDraft, ScenePatch,
};
use panelforge_core::error::StoreError;
use panelforge_core::{ContentStore, Project};
use tracing::{debug, info};

use crate::in_memory::InMemoryContentStore;
use crate::tree::ProjectSet;

pub struct FileContentStore {
    path: PathBuf,
    inner: InMemoryContentStore,
}

impl FileContentStore {
    /// Open the file at `path`. A missing file starts empty and is created
    /// on the first write; an unreadable one is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let set = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => ProjectSet::default(),
            Ok(content) => serde_json::from_str::<ProjectSet>(&content)
                .map_err(|e| StoreError::Corrupted(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ProjectSet::default(),
            Err(e) => return Err(StoreError::Storage(format!("Failed to read {}: {e}", path.display()))),
        };
        debug!(path = %path.display(), projects = set.projects.len(), "File content store loaded");

        Ok(Self {
            path,
            inner: InMemoryContentStore::with_projects(set.projects),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn put_project(&self, project: Project) -> Result<(), StoreError> {
        debug!(project = %project.id, "Storing project");
        self.commit(|set| {
            set.upsert_project(project);
            Some(())
        })
        .await?;
        Ok(())
    }

    pub async fn project_ids(&self) -> Vec<String> {
        self.inner.project_ids().await
    }

    /// Apply `change` to a copy of the tree, write the copy out, and only
    /// then make it visible. The write lock is held throughout so writers
    /// reach the file in the same order they reach memory.
    async fn commit<T>(&self, change: impl FnOnce(&mut ProjectSet) -> Option<T>) -> Result<Option<T>, StoreError> {
        let mut guard = self.inner.set.write().await;
        let mut next = guard.clone();
        let Some(written) = change(&mut next) else {
            return Ok(None);
        };

        self.write_file(&next).await?;
        *guard = next;
        info!(path = %self.path.display(), "Content file updated");
        Ok(Some(written))
    }

    async fn write_file(&self, set: &ProjectSet) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Storage(format!("Failed to create store directory: {e}")))?;
        }

        let content = serde_json::to_string_pretty(set)
            .map_err(|e| StoreError::Storage(format!("Failed to serialize projects: {e}")))?;

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        tokio::fs::write(&staging, content)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to write content file: {e}")))?;
        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(StoreError::Storage(format!("Failed to replace content file: {e}")));
        }

        Ok(())
    }
}

#[async_trait]
impl ContentStore for FileContentStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>, StoreError> {
        self.inner.get_project(id).await
    }

    async fn get_character(&self, id: &str) -> Result<Option<Character>, StoreError> {
        self.inner.get_character(id).await
    }

    async fn get_chapter(&self, id: &str) -> Result<Option<Chapter>, StoreError> {
        self.inner.get_chapter(id).await
    }

    async fn get_scene(&self, id: &str) -> Result<Option<Scene>, StoreError> {
        self.inner.get_scene(id).await
    }

    async fn get_panel(&self, id: &str) -> Result<Option<Panel>, StoreError> {
        self.inner.get_panel(id).await
    }

    async fn get_dialogue(&self, id: &str) -> Result<Option<Dialogue>, StoreError> {
        self.inner.get_dialogue(id).await
    }

    async fn update_character(&self, id: &str, patch: CharacterPatch) -> Result<Option<Character>, StoreError> {
        self.commit(|set| set.update_character(id, patch)).await
    }

    async fn update_chapter(&self, id: &str, patch: ChapterPatch) -> Result<Option<Chapter>, StoreError> {
        self.commit(|set| set.update_chapter(id, patch)).await
    }

    async fn update_scene(&self, id: &str, patch: ScenePatch) -> Result<Option<Scene>, StoreError> {
        self.commit(|set| set.update_scene(id, patch)).await
    }

    async fn update_panel(&self, id: &str, patch: PanelPatch) -> Result<Option<Panel>, StoreError> {
        self.commit(|set| set.update_panel(id, patch)).await
    }

    async fn update_dialogue(&self, id: &str, patch: DialoguePatch) -> Result<Option<Dialogue>, StoreError> {
        self.commit(|set| set.update_dialogue(id, patch)).await
    }

    async fn create_character(&self, project_id: &str, draft: CharacterDraft) -> Result<Option<Character>, StoreError> {
        self.commit(|set| set.create_character(project_id, draft)).await
    }

    async fn create_chapter(&self, project_id: &str, draft: ChapterDraft) -> Result<Option<Chapter>, StoreError> {
        self.commit(|set| set.create_chapter(project_id, draft)).await
    }

    async fn create_scene(&self, chapter_id: &str, draft: SceneDraft) -> Result<Option<Scene>, StoreError> {
        self.commit(|set| set.create_scene(chapter_id, draft)).await
    }

    async fn create_panel(&self, scene_id: &str, draft: PanelDraft) -> Result<Option<Panel>, StoreError> {
        self.commit(|set| set.create_panel(scene_id, draft)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_project;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileContentStore::open(dir.path().join("projects.json")).unwrap();
        assert!(store.project_ids().await.is_empty());
        assert!(store.get_project("p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn writes_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("projects.json");

        let store = FileContentStore::open(&path).unwrap();
        store.put_project(sample_project()).await.unwrap();
        store
            .update_panel("pn1", PanelPatch { image_url: Some("https://img.example/pn1.png".into()), ..Default::default() })
            .await
            .unwrap()
            .unwrap();

        let reopened = FileContentStore::open(&path).unwrap();
        let panel = reopened.get_panel("pn1").await.unwrap().unwrap();
        assert_eq!(panel.image_url.as_deref(), Some("https://img.example/pn1.png"));
    }

    #[tokio::test]
    async fn no_op_update_does_not_create_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("projects.json");
        let store = FileContentStore::open(&path).unwrap();
        assert!(store.update_scene("nope", ScenePatch::default()).await.unwrap().is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("projects.json");
        let store = FileContentStore::open(&path).unwrap();
        store.put_project(sample_project()).await.unwrap();

        // A directory where the file should be makes the replace fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let result = store
            .update_scene("s1", ScenePatch { title: Some("Ghost Light".into()), ..Default::default() })
            .await;
        assert!(matches!(result, Err(StoreError::Storage(_))));
        assert_eq!(store.get_scene("s1").await.unwrap().unwrap().title, "Storm Watch");
        assert!(!dir.path().join("projects.json.tmp").exists());
    }

    #[tokio::test]
    async fn concurrent_writes_all_reach_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("projects.json");
        let store = std::sync::Arc::new(FileContentStore::open(&path).unwrap());
        store.put_project(sample_project()).await.unwrap();

        let scene = {
            let store = store.clone();
            tokio::spawn(async move {
                store.update_scene("s1", ScenePatch { title: Some("Night Shift".into()), ..Default::default() }).await
            })
        };
        let panel = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .update_panel("pn1", PanelPatch { image_url: Some("https://img.example/a.png".into()), ..Default::default() })
                    .await
            })
        };
        scene.await.unwrap().unwrap().unwrap();
        panel.await.unwrap().unwrap().unwrap();

        let reopened = FileContentStore::open(&path).unwrap();
        assert_eq!(reopened.get_scene("s1").await.unwrap().unwrap().title, "Night Shift");
        assert_eq!(
            reopened.get_panel("pn1").await.unwrap().unwrap().image_url.as_deref(),
            Some("https://img.example/a.png")
        );
    }

    #[test]
    fn corrupted_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("projects.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = FileContentStore::open(&path).err().unwrap();
        assert!(matches!(err, StoreError::Corrupted(_)));
    }
}
