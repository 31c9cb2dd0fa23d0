use panelforge_context::FullContext;
use panelforge_core::action::GenerateContent;
use panelforge_core::content::{CharacterDraft, ChapterDraft, PanelDraft, SceneDraft};
use panelforge_core::{ContentKind, ContentStore};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::HandlerContext;
use crate::planner::parent_kind;
use crate::result::{AssistResult, ErrorCode, Failure};
use crate::schemas::items_key;
use crate::generation_prompt;

pub(crate) async fn handle(cx: &HandlerContext<'_>, request: GenerateContent) -> Result<AssistResult, Failure> {
    let kind = request.content_type;
    if matches!(kind, ContentKind::Project | ContentKind::Dialogue) {
        return Err(Failure::unsupported(format!(
            "I can generate characters, chapters, scenes and panels, but not a {kind}."
        )));
    }

    // characters and chapters hang off the project itself
    let container = match parent_kind(kind) {
        Some(parent) => request
            .parent_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| Failure::new(ErrorCode::InvalidAction, format!("A new {kind} needs a {parent} to go in")))?,
        None => cx.project.id.clone(),
    };
    let projection = FullContext::new(cx.project)
        .for_generation(kind, Some(&container))
        .ok_or_else(|| Failure::not_found(parent_kind(kind).unwrap_or(ContentKind::Project), &container))?;

    let name = generation_prompt(kind);
    let prompt = cx
        .registry
        .prompt(&name)
        .ok_or_else(|| Failure::execution(format!("Prompt '{name}' is not registered")))?;

    info!(kind = %kind, parent = %container, "Generating content");
    let input = json!({
        "projectContext": projection,
        "instructions": request.instructions,
        "count": request.count.unwrap_or(1).max(1),
    });
    let data = prompt
        .call(input, &cx.call_context(), &cx.history())
        .await
        .ok_or_else(|| Failure::execution(format!("Sorry, generating the {kind} didn't work. Please try again.")))?;

    let created_ids = if cx.settings.persist_generated {
        persist(cx.store, kind, &container, &data).await?
    } else {
        Vec::new()
    };

    Ok(AssistResult::Generated {
        content_type: kind,
        parent_id: request.parent_id,
        data,
        created_ids,
    })
}

enum Draft {
    Character(CharacterDraft),
    Chapter(ChapterDraft),
    Scene(SceneDraft),
    Panel(PanelDraft),
}

fn parse<T: DeserializeOwned>(item: Value) -> Result<T, Failure> {
    serde_json::from_value(item).map_err(|e| Failure::execution(format!("Generated item is malformed: {e}")))
}

impl Draft {
    fn parse(kind: ContentKind, item: Value) -> Result<Option<Self>, Failure> {
        Ok(match kind {
            ContentKind::Character => Some(Draft::Character(parse(item)?)),
            ContentKind::Chapter => Some(Draft::Chapter(parse(item)?)),
            ContentKind::Scene => Some(Draft::Scene(parse(item)?)),
            ContentKind::Panel => Some(Draft::Panel(parse(item)?)),
            ContentKind::Project | ContentKind::Dialogue => None,
        })
    }

    async fn create(self, store: &dyn ContentStore, parent_id: &str) -> Result<Option<String>, Failure> {
        Ok(match self {
            Draft::Character(d) => store.create_character(parent_id, d).await?.map(|c| c.id),
            Draft::Chapter(d) => store.create_chapter(parent_id, d).await?.map(|c| c.id),
            Draft::Scene(d) => store.create_scene(parent_id, d).await?.map(|s| s.id),
            Draft::Panel(d) => store.create_panel(parent_id, d).await?.map(|p| p.id),
        })
    }
}

/// Create every generated item under `parent_id`, in order.
///
/// All items are parsed before the first write, so a malformed item
/// creates nothing. A store failure part way through names the ids that
/// were already created.
async fn persist(
    store: &dyn ContentStore,
    kind: ContentKind,
    parent_id: &str,
    data: &Value,
) -> Result<Vec<String>, Failure> {
    let items = data
        .get(items_key(kind))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut drafts = Vec::with_capacity(items.len());
    for item in items {
        drafts.extend(Draft::parse(kind, item)?);
    }

    let mut ids = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let failure = match draft.create(store, parent_id).await {
            Ok(Some(id)) => {
                ids.push(id);
                continue;
            }
            Ok(None) => Failure::not_found(parent_kind(kind).unwrap_or(ContentKind::Project), parent_id),
            Err(failure) => failure,
        };
        if ids.is_empty() {
            return Err(failure);
        }
        warn!(kind = %kind, parent = %parent_id, created = ?ids, "Generated content only partly persisted");
        return Err(Failure::new(
            failure.code,
            format!("{}. Already saved {kind}(s): {}", failure.message, ids.join(", ")),
        ));
    }

    info!(kind = %kind, parent = %parent_id, count = ids.len(), "Persisted generated content");
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FlakyStore;

    fn two_panels() -> Value {
        json!({
            "panels": [
                {"description": "Mira lifts the lantern.", "shot": "medium", "characterIds": ["c1"], "dialogues": []},
                {"description": "The lantern flares.", "shot": "insert", "characterIds": [], "dialogues": []}
            ]
        })
    }

    #[tokio::test]
    async fn malformed_item_creates_nothing() {
        let store = FlakyStore::new(usize::MAX);
        let mut data = two_panels();
        data["panels"][1]["characterIds"] = json!("c1");

        let failure = persist(&store, ContentKind::Panel, "s2", &data).await.unwrap_err();
        assert_eq!(failure.code, ErrorCode::ExecutionFailed);
        assert!(failure.message.starts_with("Generated item is malformed"), "{}", failure.message);
        assert_eq!(store.get_scene("s2").await.unwrap().unwrap().panels.len(), 1);
    }

    #[tokio::test]
    async fn store_failure_part_way_names_saved_ids() {
        let store = FlakyStore::new(1);

        let failure = persist(&store, ContentKind::Panel, "s2", &two_panels()).await.unwrap_err();
        let panels = store.get_scene("s2").await.unwrap().unwrap().panels;
        assert_eq!(panels.len(), 2);
        assert_eq!(failure.code, ErrorCode::ExecutionFailed);
        assert!(failure.message.starts_with("Content store error"), "{}", failure.message);
        assert!(failure.message.ends_with(&format!("Already saved panel(s): {}", panels[1].id)), "{}", failure.message);
    }

    #[tokio::test]
    async fn first_write_failure_is_reported_as_is() {
        let store = FlakyStore::new(0);
        let failure = persist(&store, ContentKind::Panel, "s2", &two_panels()).await.unwrap_err();
        assert!(!failure.message.contains("Already saved"), "{}", failure.message);
    }
}
