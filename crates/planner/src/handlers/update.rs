use panelforge_context::MinimalContext;
use panelforge_core::action::UpdateContent;
use panelforge_tools::{UPDATABLE_KINDS, tool_name};
use serde_json::{Value, json};
use tracing::info;

use super::HandlerContext;
use crate::edit_prompt;
use crate::result::{AssistResult, Failure};

pub(crate) async fn handle(cx: &HandlerContext<'_>, request: UpdateContent) -> Result<AssistResult, Failure> {
    let kind = request.content_type;
    if !UPDATABLE_KINDS.contains(&kind) {
        return Err(Failure::unsupported(format!("A {kind} cannot be edited from the assistant.")));
    }

    let id = request.content_id.trim();
    let projection = MinimalContext::new(cx.project)
        .for_update(kind, id)
        .ok_or_else(|| Failure::not_found(kind, id))?;

    let name = edit_prompt(kind);
    let prompt = cx
        .registry
        .prompt(&name)
        .ok_or_else(|| Failure::execution(format!("Prompt '{name}' is not registered")))?;

    info!(kind = %kind, id, "Updating content");
    let input = json!({
        "target": projection,
        "contentId": id,
        "instructions": request.instructions,
        "toolName": tool_name(kind),
    });
    let message = prompt
        .call(input, &cx.call_context(), &cx.history())
        .await
        .and_then(|reply| match reply {
            Value::String(text) => Some(text),
            _ => None,
        })
        .ok_or_else(|| Failure::execution(format!("Sorry, updating the {kind} didn't work. Please try again.")))?;

    Ok(AssistResult::Updated {
        content_type: kind,
        content_id: id.to_string(),
        message,
    })
}
