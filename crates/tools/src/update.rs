//! `update_<kind>` tools: patch one entity of the content tree.
//!
//! Arguments are the entity `id` plus any subset of its editable fields.
//! When the call context carries a `projectId`, the entity must belong to
//! that project.

use std::sync::Arc;

use panelforge_capabilities::{ToolCapability, ToolSpec, define_tool, implementation};
use panelforge_core::{BoxError, CapabilityError, ContentKind, ContentStore, ContextMap, ContextStore};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::info;

/// Tool name for updates of `kind`.
pub fn tool_name(kind: ContentKind) -> String {
    format!("update_{kind}")
}

fn string() -> Value {
    json!({"type": "string"})
}

fn order() -> Value {
    json!({"type": "integer", "minimum": 1})
}

/// Editable fields per kind, in the patch structs' wire names.
fn editable_fields(kind: ContentKind) -> Option<Value> {
    let fields = match kind {
        ContentKind::Character => json!({
            "name": string(),
            "role": string(),
            "description": string(),
            "appearance": string(),
            "personality": string(),
            "referenceImageUrl": string(),
        }),
        ContentKind::Chapter => json!({
            "title": string(),
            "order": order(),
            "summary": string(),
        }),
        ContentKind::Scene => json!({
            "title": string(),
            "order": order(),
            "setting": string(),
            "description": string(),
        }),
        ContentKind::Panel => json!({
            "order": order(),
            "description": string(),
            "shot": string(),
            "characterIds": {"type": "array", "items": string()},
        }),
        ContentKind::Dialogue => json!({
            "speakerId": string(),
            "text": string(),
            "kind": {"type": "string", "enum": ["speech", "thought", "narration", "sfx"]},
        }),
        ContentKind::Project => return None,
    };
    Some(fields)
}

fn input_schema(kind: ContentKind, fields: Value) -> Value {
    let mut properties = fields;
    if let Some(map) = properties.as_object_mut() {
        map.insert(
            "id".into(),
            json!({"type": "string", "description": format!("ID of the {kind} to update")}),
        );
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": ["id"],
        "additionalProperties": false
    })
}

fn patch<T: DeserializeOwned>(fields: Value) -> Result<T, BoxError> {
    Ok(serde_json::from_value(integral_numbers(fields))?)
}

/// Whole-valued floats (`2.0`) pass the `integer` check, so turn them into
/// integers before they meet the `u32` fields of a patch.
fn integral_numbers(value: Value) -> Value {
    match value {
        Value::Number(n) if n.as_i64().is_none() && n.as_u64().is_none() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && (0.0..=u64::MAX as f64).contains(&f) => json!(f as u64),
            Some(f) if f.fract() == 0.0 && (i64::MIN as f64..0.0).contains(&f) => json!(f as i64),
            _ => Value::Number(n),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(integral_numbers).collect()),
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, integral_numbers(v))).collect()),
        other => other,
    }
}

fn to_json<T: Serialize>(entity: Option<T>) -> Result<Option<Value>, BoxError> {
    Ok(entity.map(serde_json::to_value).transpose()?)
}

async fn apply_update(
    store: &dyn ContentStore,
    kind: ContentKind,
    id: &str,
    fields: Value,
) -> Result<Option<Value>, BoxError> {
    match kind {
        ContentKind::Character => to_json(store.update_character(id, patch(fields)?).await?),
        ContentKind::Chapter => to_json(store.update_chapter(id, patch(fields)?).await?),
        ContentKind::Scene => to_json(store.update_scene(id, patch(fields)?).await?),
        ContentKind::Panel => to_json(store.update_panel(id, patch(fields)?).await?),
        ContentKind::Dialogue => to_json(store.update_dialogue(id, patch(fields)?).await?),
        ContentKind::Project => Ok(None),
    }
}

async fn run(
    store: Arc<dyn ContentStore>,
    kind: ContentKind,
    input: Value,
    context: ContextMap,
) -> Result<Value, BoxError> {
    let mut fields = match input {
        Value::Object(map) => map,
        _ => return Err(CapabilityError::execution(tool_name(kind), "arguments must be an object").into()),
    };
    let id = match fields.remove("id") {
        Some(Value::String(id)) if !id.is_empty() => id,
        _ => return Err(CapabilityError::execution(tool_name(kind), "an entity id is required").into()),
    };

    if let Some(project_id) = context.get("projectId").and_then(Value::as_str) {
        let in_project = store
            .get_project(project_id)
            .await?
            .is_some_and(|project| project.contains(kind, &id));
        if !in_project {
            return Err(CapabilityError::not_found(kind.as_str(), &id).into());
        }
    }

    let changed: Vec<String> = fields.keys().cloned().collect();
    let updated = apply_update(store.as_ref(), kind, &id, Value::Object(fields))
        .await?
        .ok_or_else(|| CapabilityError::not_found(kind.as_str(), &id))?;

    info!(kind = %kind, id = %id, fields = ?changed, "Content updated");

    Ok(json!({
        "status": "updated",
        "type": kind,
        "id": id,
        "data": updated,
    }))
}

/// Build the update tool for `kind`. Projects themselves are not updatable.
pub fn update_tool(
    kind: ContentKind,
    store: Arc<dyn ContentStore>,
    context: Arc<ContextStore>,
) -> Result<ToolCapability, CapabilityError> {
    let name = tool_name(kind);
    let fields = editable_fields(kind)
        .ok_or_else(|| CapabilityError::definition(&name, "projects cannot be updated through a tool"))?;

    let spec = ToolSpec {
        name,
        description: format!(
            "Update fields of an existing {kind}. Pass the {kind} id and only the fields that change."
        ),
        input_schema: Some(input_schema(kind, fields)),
        output_schema: None,
    };

    define_tool(
        spec,
        context,
        implementation(move |input, ctx| run(store.clone(), kind, input, ctx)),
    )
}
