//! Scripted collaborators for planner tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use panelforge_core::content::{
    Chapter, ChapterDraft, ChapterPatch, Character, CharacterDraft, CharacterPatch, Dialogue, DialoguePatch,
    Panel, PanelDraft, PanelPatch, Scene, SceneDraft, ScenePatch,
};
use panelforge_core::error::{ProviderError, StoreError};
use panelforge_core::provider::{GeneratedImage, ImageRequest};
use panelforge_core::{ContentStore, ContextStore, GenerateRequest, ImageFetcher, Message, ModelAdapter, Project};
use panelforge_store::InMemoryContentStore;
use panelforge_store::fixtures::sample_project;
use serde_json::Value;

use crate::{Assistant, AssistantDeps, AssistantSettings};

pub enum Reply {
    Text(String),
    /// Invoke `tool` with `args`, then answer with `then`.
    CallTool { tool: String, args: Value, then: String },
}

pub fn json_reply(value: Value) -> Reply {
    Reply::Text(value.to_string())
}

pub fn text_reply(text: &str) -> Reply {
    Reply::Text(text.into())
}

pub fn tool_reply(tool: &str, args: Value, then: &str) -> Reply {
    Reply::CallTool {
        tool: tool.into(),
        args,
        then: then.into(),
    }
}

/// Model adapter that answers from a script, running tools for real.
#[derive(Default)]
pub struct ScriptedAdapter {
    replies: Mutex<VecDeque<Reply>>,
    pub requests: Mutex<Vec<GenerateRequest>>,
    pub image_requests: Mutex<Vec<ImageRequest>>,
}

impl ScriptedAdapter {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        })
    }

    /// Rendered prompt of the `index`-th request.
    pub fn prompt(&self, index: usize) -> String {
        let requests = self.requests.lock().unwrap();
        requests[index].messages.last().map(|m| m.content.clone()).unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelAdapter for ScriptedAdapter {
    async fn send(&self, request: GenerateRequest) -> Result<Vec<Message>, ProviderError> {
        let reply = self.replies.lock().unwrap().pop_front();
        let tools = request.tools.clone();
        let context = request.context.clone();
        self.requests.lock().unwrap().push(request);

        match reply {
            Some(Reply::Text(text)) => Ok(vec![Message::assistant(text)]),
            Some(Reply::CallTool { tool, args, then }) => {
                let output = match tools.iter().find(|t| t.name() == tool) {
                    Some(t) => t.invoke(args, &context).await,
                    None => format!("Error: unknown tool '{tool}'"),
                };
                Ok(vec![
                    Message::tool_result(format!("call_{tool}"), output),
                    Message::assistant(then),
                ])
            }
            None => Err(ProviderError::Network("no scripted reply".into())),
        }
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, ProviderError> {
        self.image_requests.lock().unwrap().push(request);
        Ok(GeneratedImage {
            url: Some("https://img.example/generated/out.png".into()),
            model: "image-test".into(),
            ..Default::default()
        })
    }
}

/// Inlines any URL as a fake data URL; URLs containing "broken" fail.
pub struct StubFetcher;

#[async_trait]
impl ImageFetcher for StubFetcher {
    async fn fetch_data_url(&self, url: &str) -> Result<String, ProviderError> {
        if url.contains("broken") {
            return Err(ProviderError::Network(format!("cannot reach {url}")));
        }
        Ok(format!("data:image/png;base64,{}", url.len()))
    }
}

pub struct Harness {
    pub assistant: Assistant,
    pub adapter: Arc<ScriptedAdapter>,
    pub store: Arc<InMemoryContentStore>,
}

pub fn harness(replies: Vec<Reply>, settings: AssistantSettings) -> Harness {
    let adapter = ScriptedAdapter::new(replies);
    let store = Arc::new(InMemoryContentStore::with_projects(vec![sample_project()]));
    let assistant = Assistant::new(
        AssistantDeps {
            store: store.clone() as Arc<dyn ContentStore>,
            adapter: adapter.clone(),
            fetcher: Arc::new(StubFetcher),
            context: Arc::new(ContextStore::new()),
        },
        settings,
    )
    .unwrap();
    Harness {
        assistant,
        adapter,
        store,
    }
}

/// Sample-project store whose creates start failing after `creates` succeed.
pub struct FlakyStore {
    inner: InMemoryContentStore,
    creates_left: AtomicUsize,
}

impl FlakyStore {
    pub fn new(creates: usize) -> Self {
        Self {
            inner: InMemoryContentStore::with_projects(vec![sample_project()]),
            creates_left: AtomicUsize::new(creates),
        }
    }

    fn take_create(&self) -> Result<(), StoreError> {
        self.creates_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map(|_| ())
            .map_err(|_| StoreError::Storage("disk full".into()))
    }
}

#[async_trait]
impl ContentStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
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
        self.inner.update_character(id, patch).await
    }

    async fn update_chapter(&self, id: &str, patch: ChapterPatch) -> Result<Option<Chapter>, StoreError> {
        self.inner.update_chapter(id, patch).await
    }

    async fn update_scene(&self, id: &str, patch: ScenePatch) -> Result<Option<Scene>, StoreError> {
        self.inner.update_scene(id, patch).await
    }

    async fn update_panel(&self, id: &str, patch: PanelPatch) -> Result<Option<Panel>, StoreError> {
        self.inner.update_panel(id, patch).await
    }

    async fn update_dialogue(&self, id: &str, patch: DialoguePatch) -> Result<Option<Dialogue>, StoreError> {
        self.inner.update_dialogue(id, patch).await
    }

    async fn create_character(&self, project_id: &str, draft: CharacterDraft) -> Result<Option<Character>, StoreError> {
        self.take_create()?;
        self.inner.create_character(project_id, draft).await
    }

    async fn create_chapter(&self, project_id: &str, draft: ChapterDraft) -> Result<Option<Chapter>, StoreError> {
        self.take_create()?;
        self.inner.create_chapter(project_id, draft).await
    }

    async fn create_scene(&self, chapter_id: &str, draft: SceneDraft) -> Result<Option<Scene>, StoreError> {
        self.take_create()?;
        self.inner.create_scene(chapter_id, draft).await
    }

    async fn create_panel(&self, scene_id: &str, draft: PanelDraft) -> Result<Option<Panel>, StoreError> {
        self.take_create()?;
        self.inner.create_panel(scene_id, draft).await
    }
}
