//! Intent planner: turns a user request into one validated action.
//!
//! Classification runs the `classify_intent` prompt against a trimmed
//! outline of the project. The model is told never to guess IDs, and the
//! guards below hold it to that: an action missing an ID it needs is
//! either completed from the selected node or turned into a clarifying
//! question.

use std::sync::Arc;

use panelforge_capabilities::PromptCapability;
use panelforge_context::MinimalContext;
use panelforge_core::action::{GenerateContent, GenerateImage, UpdateContent};
use panelforge_core::{ActionDescriptor, ChatTurn, ContentKind, ContextMap, Project, SelectedNode};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::result::{AssistRequest, ErrorCode, Failure};

pub(crate) struct IntentPlanner {
    classifier: Arc<PromptCapability>,
    history_limit: usize,
}

impl IntentPlanner {
    pub(crate) fn new(classifier: Arc<PromptCapability>, history_limit: usize) -> Self {
        Self {
            classifier,
            history_limit,
        }
    }

    /// Classify `request` and apply the guards.
    pub(crate) async fn plan(&self, project: &Project, request: &AssistRequest) -> Result<ActionDescriptor, Failure> {
        let raw = self.classify(project, request).await?;
        let descriptor = ActionDescriptor::from_value(raw).map_err(|e| {
            warn!(error = %e, "Classifier returned an invalid action");
            Failure::new(ErrorCode::InvalidAction, format!("Could not understand the request: {e}"))
        })?;
        debug!(action = %descriptor.kind(), "Classified request");
        Ok(apply_guards(descriptor, request.selected_node.as_ref(), project))
    }

    async fn classify(&self, project: &Project, request: &AssistRequest) -> Result<Value, Failure> {
        let input = json!({
            "userInput": request.user_input,
            "projectContext": MinimalContext::new(project).outline(),
            "selectedNode": request.selected_node,
            "prevChats": recent(&request.prev_chats, self.history_limit),
        });
        let mut context = ContextMap::new();
        context.insert("projectId".into(), json!(project.id));

        self.classifier.call(input, &context, &[]).await.ok_or_else(|| {
            Failure::new(
                ErrorCode::ClassificationFailed,
                "Sorry, I couldn't work out what to do with that request.",
            )
        })
    }
}

/// The last `limit` turns.
pub(crate) fn recent(turns: &[ChatTurn], limit: usize) -> &[ChatTurn] {
    &turns[turns.len().saturating_sub(limit)..]
}

/// Fill in missing IDs from the selection, or ask the user.
pub fn apply_guards(
    descriptor: ActionDescriptor,
    selected: Option<&SelectedNode>,
    project: &Project,
) -> ActionDescriptor {
    match descriptor {
        ActionDescriptor::UpdateContent(update) => guard_update(update, selected),
        ActionDescriptor::GenerateContent(generate) => guard_generate(generate, selected, project),
        ActionDescriptor::GenerateImage(image) => guard_image(image, selected),
        other => other,
    }
}

fn guard_update(mut update: UpdateContent, selected: Option<&SelectedNode>) -> ActionDescriptor {
    if update.content_id.trim().is_empty() {
        match selected.filter(|node| node.kind() == update.content_type) {
            Some(node) => update.content_id = node.id().to_string(),
            None => {
                return ActionDescriptor::direct(format!(
                    "Which {} do you want to change? Select it in the editor or mention it by name.",
                    update.content_type
                ));
            }
        }
    }
    ActionDescriptor::UpdateContent(update)
}

fn guard_generate(
    mut generate: GenerateContent,
    selected: Option<&SelectedNode>,
    project: &Project,
) -> ActionDescriptor {
    let Some(parent_kind) = parent_kind(generate.content_type) else {
        return ActionDescriptor::GenerateContent(generate);
    };
    if generate.parent_id.as_deref().is_some_and(|id| !id.trim().is_empty()) {
        return ActionDescriptor::GenerateContent(generate);
    }

    match selected.and_then(|node| enclosing(project, node, parent_kind)) {
        Some(id) => {
            debug!(parent = %id, "Borrowed parent from selection");
            generate.parent_id = Some(id);
            ActionDescriptor::GenerateContent(generate)
        }
        None => ActionDescriptor::direct(format!(
            "Which {parent_kind} should the new {} go in?",
            new_item_noun(generate.content_type)
        )),
    }
}

fn guard_image(mut image: GenerateImage, selected: Option<&SelectedNode>) -> ActionDescriptor {
    if image.target_id.trim().is_empty() {
        match selected.filter(|node| node.kind() == image.target_type) {
            Some(node) => image.target_id = node.id().to_string(),
            None => {
                return ActionDescriptor::direct(format!("Which {} should I draw?", image.target_type));
            }
        }
    }
    ActionDescriptor::GenerateImage(image)
}

/// Kind of container new content of `kind` lives in, when it is not the
/// project itself.
pub(crate) fn parent_kind(kind: ContentKind) -> Option<ContentKind> {
    match kind {
        ContentKind::Scene => Some(ContentKind::Chapter),
        ContentKind::Panel => Some(ContentKind::Scene),
        _ => None,
    }
}

fn new_item_noun(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Scene => "scene",
        _ => "panels",
    }
}

/// ID of the `wanted` container that is `node` or holds it.
fn enclosing(project: &Project, node: &SelectedNode, wanted: ContentKind) -> Option<String> {
    if node.kind() == wanted {
        return Some(node.id().to_string());
    }
    let id = node.id();
    match (wanted, node) {
        (ContentKind::Chapter, SelectedNode::Scene { .. }) => project.scene(id).map(|(c, _)| c.id.clone()),
        (ContentKind::Chapter, SelectedNode::Panel { .. }) => project.panel(id).map(|(c, _, _)| c.id.clone()),
        (ContentKind::Chapter, SelectedNode::Dialogue { .. }) => {
            let (scene, _, _) = project.dialogue(id)?;
            project.scene(&scene.id).map(|(c, _)| c.id.clone())
        }
        (ContentKind::Scene, SelectedNode::Panel { .. }) => project.panel(id).map(|(_, s, _)| s.id.clone()),
        (ContentKind::Scene, SelectedNode::Dialogue { .. }) => project.dialogue(id).map(|(s, _, _)| s.id.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelforge_core::ActionKind;
    use panelforge_store::fixtures::sample_project;

    fn update(kind: ContentKind, id: &str) -> ActionDescriptor {
        ActionDescriptor::UpdateContent(UpdateContent {
            content_type: kind,
            content_id: id.into(),
            instructions: "make it rain".into(),
        })
    }

    fn generate(kind: ContentKind, parent: Option<&str>) -> ActionDescriptor {
        ActionDescriptor::GenerateContent(GenerateContent {
            content_type: kind,
            parent_id: parent.map(String::from),
            instructions: "more tension".into(),
            count: None,
        })
    }

    fn direct_text(descriptor: &ActionDescriptor) -> &str {
        match descriptor {
            ActionDescriptor::DirectResponse(d) => &d.content,
            other => panic!("expected directResponse, got {other:?}"),
        }
    }

    #[test]
    fn update_without_id_or_selection_asks() {
        let out = apply_guards(update(ContentKind::Scene, ""), None, &sample_project());
        assert!(direct_text(&out).contains("Which scene"));
    }

    #[test]
    fn update_without_id_borrows_matching_selection() {
        let node = SelectedNode::of(ContentKind::Scene, "s2");
        let out = apply_guards(update(ContentKind::Scene, " "), Some(&node), &sample_project());
        let ActionDescriptor::UpdateContent(u) = out else { panic!("expected update") };
        assert_eq!(u.content_id, "s2");

        // a selected panel does not identify a scene to update
        let node = SelectedNode::of(ContentKind::Panel, "pn1");
        let out = apply_guards(update(ContentKind::Scene, ""), Some(&node), &sample_project());
        assert_eq!(out.kind(), ActionKind::DirectResponse);
    }

    #[test]
    fn explicit_ids_are_left_alone() {
        let out = apply_guards(update(ContentKind::Panel, "pn404"), None, &sample_project());
        assert_eq!(out, update(ContentKind::Panel, "pn404"));
    }

    #[test]
    fn panel_generation_finds_scene_from_selection() {
        let project = sample_project();
        for (node, expected) in [
            (SelectedNode::of(ContentKind::Scene, "s2"), "s2"),
            (SelectedNode::of(ContentKind::Panel, "pn2"), "s1"),
            (SelectedNode::of(ContentKind::Dialogue, "d4"), "s2"),
        ] {
            let out = apply_guards(generate(ContentKind::Panel, None), Some(&node), &project);
            let ActionDescriptor::GenerateContent(g) = out else { panic!("expected generate") };
            assert_eq!(g.parent_id.as_deref(), Some(expected));
        }
    }

    #[test]
    fn scene_generation_finds_chapter_from_selection() {
        let project = sample_project();
        let node = SelectedNode::of(ContentKind::Panel, "pn3");
        let out = apply_guards(generate(ContentKind::Scene, None), Some(&node), &project);
        let ActionDescriptor::GenerateContent(g) = out else { panic!("expected generate") };
        assert_eq!(g.parent_id.as_deref(), Some("ch1"));

        let out = apply_guards(generate(ContentKind::Scene, Some("")), None, &project);
        assert_eq!(direct_text(&out), "Which chapter should the new scene go in?");
    }

    #[test]
    fn top_level_generation_needs_no_parent() {
        let out = apply_guards(generate(ContentKind::Character, None), None, &sample_project());
        assert_eq!(out.kind(), ActionKind::GenerateContent);
    }

    #[test]
    fn image_without_target_uses_selection() {
        let image = ActionDescriptor::GenerateImage(GenerateImage {
            target_type: ContentKind::Character,
            target_id: String::new(),
            instructions: String::new(),
        });
        let node = SelectedNode::of(ContentKind::Character, "c2");
        let ActionDescriptor::GenerateImage(g) = apply_guards(image.clone(), Some(&node), &sample_project()) else {
            panic!("expected image")
        };
        assert_eq!(g.target_id, "c2");

        let out = apply_guards(image, None, &sample_project());
        assert_eq!(direct_text(&out), "Which character should I draw?");
    }

    #[test]
    fn history_is_capped_to_most_recent() {
        let turns: Vec<_> = (0..5).map(|i| ChatTurn::user(i.to_string())).collect();
        let kept: Vec<_> = recent(&turns, 2).iter().map(|t| t.content.as_str()).collect();
        assert_eq!(kept, vec!["3", "4"]);
        assert_eq!(recent(&turns, 10).len(), 5);
    }
}
