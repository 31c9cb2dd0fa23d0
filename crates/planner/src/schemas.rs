//! Input and output schemas of the planner's capabilities.

use panelforge_core::ContentKind;
use serde_json::{Value, json};

fn string() -> Value {
    json!({"type": "string"})
}

const GENERATABLE: [&str; 4] = ["character", "chapter", "scene", "panel"];
const UPDATABLE: [&str; 5] = ["character", "chapter", "scene", "panel", "dialogue"];
const DRAWABLE: [&str; 2] = ["panel", "character"];

/// The classifier's structured output. The one-payload rule is checked
/// afterwards by `ActionDescriptor::from_value`.
pub fn action_descriptor() -> Value {
    json!({
        "type": "object",
        "properties": {
            "action": {
                "type": "string",
                "enum": ["directResponse", "generateContent", "updateContent", "generateImage"]
            },
            "directResponse": {
                "type": ["object", "null"],
                "properties": { "content": string() },
                "required": ["content"],
                "additionalProperties": false
            },
            "generateContent": {
                "type": ["object", "null"],
                "properties": {
                    "contentType": { "type": "string", "enum": GENERATABLE },
                    "parentId": { "type": ["string", "null"] },
                    "instructions": string(),
                    "count": { "type": ["integer", "null"] }
                },
                "required": ["contentType", "instructions"],
                "additionalProperties": false
            },
            "updateContent": {
                "type": ["object", "null"],
                "properties": {
                    "contentType": { "type": "string", "enum": UPDATABLE },
                    "contentId": string(),
                    "instructions": string()
                },
                "required": ["contentType", "contentId", "instructions"],
                "additionalProperties": false
            },
            "generateImage": {
                "type": ["object", "null"],
                "properties": {
                    "targetType": { "type": "string", "enum": DRAWABLE },
                    "targetId": string(),
                    "instructions": string()
                },
                "required": ["targetType", "targetId"],
                "additionalProperties": false
            }
        },
        "required": ["action"],
        "additionalProperties": false
    })
}

pub fn classify_input() -> Value {
    json!({
        "type": "object",
        "properties": {
            "userInput": string(),
            "projectContext": { "type": "object" },
            "selectedNode": { "type": ["object", "null"] },
            "prevChats": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": { "role": string(), "content": string() },
                    "required": ["role", "content"]
                }
            }
        },
        "required": ["userInput", "projectContext", "prevChats"]
    })
}

pub fn generate_input() -> Value {
    json!({
        "type": "object",
        "properties": {
            "projectContext": { "type": "object" },
            "instructions": string(),
            "count": { "type": "integer" }
        },
        "required": ["projectContext", "instructions", "count"]
    })
}

fn dialogue_draft() -> Value {
    json!({
        "type": "object",
        "properties": {
            "speakerId": { "type": ["string", "null"] },
            "text": string(),
            "kind": { "type": "string", "enum": ["speech", "thought", "narration", "sfx"] }
        },
        "required": ["text", "kind"]
    })
}

/// Draft fields for one generated item of `kind`.
fn draft(kind: ContentKind) -> Value {
    match kind {
        ContentKind::Character => json!({
            "type": "object",
            "properties": {
                "name": string(),
                "role": string(),
                "description": string(),
                "appearance": string(),
                "personality": string()
            },
            "required": ["name", "role", "description", "appearance", "personality"]
        }),
        ContentKind::Chapter => json!({
            "type": "object",
            "properties": { "title": string(), "summary": string() },
            "required": ["title", "summary"]
        }),
        ContentKind::Scene => json!({
            "type": "object",
            "properties": { "title": string(), "setting": string(), "description": string() },
            "required": ["title", "setting", "description"]
        }),
        _ => json!({
            "type": "object",
            "properties": {
                "description": string(),
                "shot": string(),
                "characterIds": { "type": "array", "items": string() },
                "dialogues": { "type": "array", "items": dialogue_draft() }
            },
            "required": ["description", "shot", "characterIds", "dialogues"]
        }),
    }
}

/// Key under which a generation result lists its items (`characters`, ...).
pub fn items_key(kind: ContentKind) -> String {
    format!("{kind}s")
}

/// `{ "<kind>s": [draft, ...] }`
pub fn generate_output(kind: ContentKind) -> Value {
    let key = items_key(kind);
    let mut properties = serde_json::Map::new();
    properties.insert(key.clone(), json!({ "type": "array", "items": draft(kind) }));
    json!({
        "type": "object",
        "properties": properties,
        "required": [key]
    })
}

pub fn edit_input() -> Value {
    json!({
        "type": "object",
        "properties": {
            "target": { "type": "object" },
            "contentId": string(),
            "instructions": string(),
            "toolName": string()
        },
        "required": ["target", "contentId", "instructions", "toolName"]
    })
}

pub fn image_flow_input() -> Value {
    json!({
        "type": "object",
        "properties": {
            "prompt": string(),
            "references": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": { "label": string(), "url": string() },
                    "required": ["label", "url"]
                }
            },
            "history": { "type": "array" }
        },
        "required": ["prompt", "references"]
    })
}

pub fn image_flow_output() -> Value {
    json!({
        "type": "object",
        "properties": {
            "url": string(),
            "b64Json": string(),
            "revisedPrompt": string(),
            "model": string()
        },
        "required": ["model"]
    })
}
