//! Action descriptors: the intent classifier's structured output.
//!
//! On the wire a descriptor is `{ "action": <kind>, <kind>: {payload} }`
//! with exactly one non-empty payload object, and it must be the one
//! named by `action`. [`ActionDescriptor`] only exists in valid form:
//! deserialization runs the check.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::content::ContentKind;

/// The four mutually exclusive handling paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    DirectResponse,
    GenerateContent,
    UpdateContent,
    GenerateImage,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::DirectResponse,
        ActionKind::GenerateContent,
        ActionKind::UpdateContent,
        ActionKind::GenerateImage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::DirectResponse => "directResponse",
            ActionKind::GenerateContent => "generateContent",
            ActionKind::UpdateContent => "updateContent",
            ActionKind::GenerateImage => "generateImage",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectResponse {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContent {
    pub content_type: ContentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContent {
    pub content_type: ContentKind,
    #[serde(default)]
    pub content_id: String,
    #[serde(default)]
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImage {
    pub target_type: ContentKind,
    pub target_id: String,
    #[serde(default)]
    pub instructions: String,
}

/// A validated action descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ActionDescriptorWire", into = "ActionDescriptorWire")]
pub enum ActionDescriptor {
    DirectResponse(DirectResponse),
    GenerateContent(GenerateContent),
    UpdateContent(UpdateContent),
    GenerateImage(GenerateImage),
}

impl ActionDescriptor {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionDescriptor::DirectResponse(_) => ActionKind::DirectResponse,
            ActionDescriptor::GenerateContent(_) => ActionKind::GenerateContent,
            ActionDescriptor::UpdateContent(_) => ActionKind::UpdateContent,
            ActionDescriptor::GenerateImage(_) => ActionKind::GenerateImage,
        }
    }

    pub fn direct(content: impl Into<String>) -> Self {
        ActionDescriptor::DirectResponse(DirectResponse {
            content: content.into(),
        })
    }

    /// Validate a raw JSON value against the descriptor invariant.
    pub fn from_value(value: Value) -> Result<Self, DescriptorError> {
        let wire: ActionDescriptorWire = serde_json::from_value(value)
            .map_err(|e| DescriptorError::Malformed(e.to_string()))?;
        Self::try_from(wire)
    }
}

/// Why a raw descriptor was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DescriptorError {
    #[error("malformed action descriptor: {0}")]
    Malformed(String),

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("expected exactly one payload, found {found:?}")]
    PayloadCount { found: Vec<ActionKind> },

    #[error("action is '{action}' but the payload is '{payload}'")]
    PayloadMismatch { action: ActionKind, payload: ActionKind },

    #[error("invalid {kind} payload: {reason}")]
    InvalidPayload { kind: ActionKind, reason: String },
}

/// The literal wire shape, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptorWire {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_image: Option<Value>,
}

impl ActionDescriptorWire {
    fn payload(&self, kind: ActionKind) -> Option<&Value> {
        match kind {
            ActionKind::DirectResponse => self.direct_response.as_ref(),
            ActionKind::GenerateContent => self.generate_content.as_ref(),
            ActionKind::UpdateContent => self.update_content.as_ref(),
            ActionKind::GenerateImage => self.generate_image.as_ref(),
        }
    }

    /// Kinds whose payload is present and not empty.
    pub fn populated(&self) -> Vec<ActionKind> {
        ActionKind::ALL
            .into_iter()
            .filter(|k| self.payload(*k).is_some_and(is_non_empty))
            .collect()
    }
}

fn is_non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

impl TryFrom<ActionDescriptorWire> for ActionDescriptor {
    type Error = DescriptorError;

    fn try_from(wire: ActionDescriptorWire) -> Result<Self, Self::Error> {
        let action = ActionKind::parse(&wire.action)
            .ok_or_else(|| DescriptorError::UnknownAction(wire.action.clone()))?;

        let populated = wire.populated();
        if populated.len() != 1 {
            return Err(DescriptorError::PayloadCount { found: populated });
        }
        if populated[0] != action {
            return Err(DescriptorError::PayloadMismatch {
                action,
                payload: populated[0],
            });
        }

        let payload = wire.payload(action).cloned().unwrap_or(Value::Null);
        let invalid = |e: serde_json::Error| DescriptorError::InvalidPayload {
            kind: action,
            reason: e.to_string(),
        };
        Ok(match action {
            ActionKind::DirectResponse => {
                ActionDescriptor::DirectResponse(serde_json::from_value(payload).map_err(invalid)?)
            }
            ActionKind::GenerateContent => {
                ActionDescriptor::GenerateContent(serde_json::from_value(payload).map_err(invalid)?)
            }
            ActionKind::UpdateContent => {
                ActionDescriptor::UpdateContent(serde_json::from_value(payload).map_err(invalid)?)
            }
            ActionKind::GenerateImage => {
                ActionDescriptor::GenerateImage(serde_json::from_value(payload).map_err(invalid)?)
            }
        })
    }
}

impl From<ActionDescriptor> for ActionDescriptorWire {
    fn from(descriptor: ActionDescriptor) -> Self {
        let mut wire = ActionDescriptorWire {
            action: descriptor.kind().as_str().to_string(),
            ..Default::default()
        };
        // Payload structs are plain data; serialization cannot fail.
        match descriptor {
            ActionDescriptor::DirectResponse(p) => wire.direct_response = serde_json::to_value(p).ok(),
            ActionDescriptor::GenerateContent(p) => wire.generate_content = serde_json::to_value(p).ok(),
            ActionDescriptor::UpdateContent(p) => wire.update_content = serde_json::to_value(p).ok(),
            ActionDescriptor::GenerateImage(p) => wire.generate_image = serde_json::to_value(p).ok(),
        }
        wire
    }
}

/// The node the user currently has selected in the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SelectedNode {
    Project {
        id: String,
    },
    Character {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Chapter {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Scene {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Panel {
        id: String,
    },
    Dialogue {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl SelectedNode {
    pub fn kind(&self) -> ContentKind {
        match self {
            SelectedNode::Project { .. } => ContentKind::Project,
            SelectedNode::Character { .. } => ContentKind::Character,
            SelectedNode::Chapter { .. } => ContentKind::Chapter,
            SelectedNode::Scene { .. } => ContentKind::Scene,
            SelectedNode::Panel { .. } => ContentKind::Panel,
            SelectedNode::Dialogue { .. } => ContentKind::Dialogue,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            SelectedNode::Project { id }
            | SelectedNode::Character { id, .. }
            | SelectedNode::Chapter { id, .. }
            | SelectedNode::Scene { id, .. }
            | SelectedNode::Panel { id }
            | SelectedNode::Dialogue { id, .. } => id,
        }
    }

    /// Build a bare node of `kind` (used by the CLI's `--select kind:id`).
    pub fn of(kind: ContentKind, id: impl Into<String>) -> Self {
        let id = id.into();
        match kind {
            ContentKind::Project => SelectedNode::Project { id },
            ContentKind::Character => SelectedNode::Character { id, name: None },
            ContentKind::Chapter => SelectedNode::Chapter { id, title: None },
            ContentKind::Scene => SelectedNode::Scene { id, title: None },
            ContentKind::Panel => SelectedNode::Panel { id },
            ContentKind::Dialogue => SelectedNode::Dialogue { id, text: None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_single_matching_payload() {
        let d = ActionDescriptor::from_value(json!({
            "action": "updateContent",
            "updateContent": {"contentType": "scene", "contentId": "s1", "instructions": "make it rain"}
        }))
        .unwrap();
        assert_eq!(d.kind(), ActionKind::UpdateContent);
        match d {
            ActionDescriptor::UpdateContent(u) => {
                assert_eq!(u.content_type, ContentKind::Scene);
                assert_eq!(u.content_id, "s1");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_two_payloads() {
        let err = ActionDescriptor::from_value(json!({
            "action": "directResponse",
            "directResponse": {"content": "hi"},
            "generateImage": {"targetType": "panel", "targetId": "pn1"}
        }))
        .unwrap_err();
        assert!(matches!(err, DescriptorError::PayloadCount { ref found } if found.len() == 2));
    }

    #[test]
    fn rejects_zero_payloads_and_empty_objects() {
        let err = ActionDescriptor::from_value(json!({"action": "directResponse"})).unwrap_err();
        assert!(matches!(err, DescriptorError::PayloadCount { ref found } if found.is_empty()));

        let err = ActionDescriptor::from_value(json!({
            "action": "directResponse",
            "directResponse": {},
            "updateContent": null
        }))
        .unwrap_err();
        assert!(matches!(err, DescriptorError::PayloadCount { .. }));
    }

    #[test]
    fn rejects_mismatched_payload() {
        let err = ActionDescriptor::from_value(json!({
            "action": "generateImage",
            "directResponse": {"content": "hi"}
        }))
        .unwrap_err();
        assert_eq!(
            err,
            DescriptorError::PayloadMismatch {
                action: ActionKind::GenerateImage,
                payload: ActionKind::DirectResponse
            }
        );
    }

    #[test]
    fn rejects_unknown_action() {
        let err = ActionDescriptor::from_value(json!({
            "action": "deleteContent",
            "directResponse": {"content": "x"}
        }))
        .unwrap_err();
        assert_eq!(err, DescriptorError::UnknownAction("deleteContent".into()));
    }

    #[test]
    fn serializes_to_wire_shape() {
        let v = serde_json::to_value(ActionDescriptor::direct("Which scene?")).unwrap();
        assert_eq!(
            v,
            json!({"action": "directResponse", "directResponse": {"content": "Which scene?"}})
        );
        let back: ActionDescriptor = serde_json::from_value(v).unwrap();
        assert_eq!(back.kind(), ActionKind::DirectResponse);
    }

    #[test]
    fn selected_node_is_tagged_by_kind() {
        let node: SelectedNode =
            serde_json::from_value(json!({"type": "scene", "id": "s1", "title": "Alley"})).unwrap();
        assert_eq!(node.kind(), ContentKind::Scene);
        assert_eq!(node.id(), "s1");
        assert_eq!(SelectedNode::of(ContentKind::Panel, "pn1"), SelectedNode::Panel { id: "pn1".into() });
    }
}
