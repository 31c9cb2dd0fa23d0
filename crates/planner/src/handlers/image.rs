//! Image generation: the `generate_image` flow and the handler that feeds it.
//!
//! The handler turns the target into a text prompt and a list of
//! character reference images. The flow inlines those references (all
//! fetched at once, a failed fetch only drops that reference) and calls
//! the model adapter's image endpoint.

use std::sync::Arc;

use futures::future::join_all;
use panelforge_capabilities::{FlowCapability, FlowSpec, define_flow, implementation};
use panelforge_context::image_subject;
use panelforge_core::action::GenerateImage;
use panelforge_core::content::{CharacterPatch, PanelPatch};
use panelforge_core::provider::{GeneratedImage, ImageRequest, ReferenceImage};
use panelforge_core::{
    BoxError, CapabilityError, ChatTurn, ContentKind, ContextStore, ImageFetcher, Message, ModelAdapter,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::HandlerContext;
use crate::IMAGE_FLOW;
use crate::result::{AssistResult, Failure};
use crate::schemas::{image_flow_input, image_flow_output};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageFlowInput {
    prompt: String,
    #[serde(default)]
    references: Vec<ReferenceImage>,
    #[serde(default)]
    history: Vec<ChatTurn>,
}

pub(crate) fn image_flow(
    context: Arc<ContextStore>,
    adapter: Arc<dyn ModelAdapter>,
    fetcher: Arc<dyn ImageFetcher>,
) -> Result<FlowCapability, CapabilityError> {
    define_flow(
        FlowSpec {
            name: IMAGE_FLOW.into(),
            input_schema: Some(image_flow_input()),
            output_schema: Some(image_flow_output()),
        },
        context,
        implementation(move |input, _context| {
            let adapter = adapter.clone();
            let fetcher = fetcher.clone();
            async move { draw(adapter.as_ref(), fetcher.as_ref(), input).await }
        }),
    )
}

async fn draw(adapter: &dyn ModelAdapter, fetcher: &dyn ImageFetcher, input: Value) -> Result<Value, BoxError> {
    let input: ImageFlowInput = serde_json::from_value(input)?;
    let request = ImageRequest {
        prompt: input.prompt,
        references: inline_references(fetcher, input.references).await,
        history: input.history.into_iter().map(Message::from).collect(),
    };
    let image = adapter
        .generate_image(request)
        .await
        .map_err(|e| CapabilityError::execution(IMAGE_FLOW, e))?;
    Ok(serde_json::to_value(image)?)
}

async fn inline_references(fetcher: &dyn ImageFetcher, references: Vec<ReferenceImage>) -> Vec<ReferenceImage> {
    let fetched = join_all(references.iter().map(|r| fetcher.fetch_data_url(&r.url))).await;
    references
        .into_iter()
        .zip(fetched)
        .filter_map(|(reference, result)| match result {
            Ok(url) => Some(ReferenceImage {
                label: reference.label,
                url,
            }),
            Err(e) => {
                warn!(label = %reference.label, error = %e, "Reference image unavailable, continuing without it");
                None
            }
        })
        .collect()
}

pub(crate) async fn handle(cx: &HandlerContext<'_>, request: GenerateImage) -> Result<AssistResult, Failure> {
    let kind = request.target_type;
    if !matches!(kind, ContentKind::Panel | ContentKind::Character) {
        return Err(Failure::unsupported(format!(
            "I can draw panels and characters, but not a {kind}."
        )));
    }

    let id = request.target_id.trim();
    let subject = image_subject(cx.project, kind, id).ok_or_else(|| Failure::not_found(kind, id))?;

    let references: Vec<Value> = subject
        .characters()
        .into_iter()
        .filter_map(|c| {
            c.reference_image_url
                .as_ref()
                .map(|url| json!({"label": c.name, "url": url}))
        })
        .collect();
    let prompt = cx.image_template.render(&json!({
        "subject": subject,
        "instructions": request.instructions,
        "referenceCount": references.len(),
    }));

    let flow = cx
        .registry
        .flow(IMAGE_FLOW)
        .ok_or_else(|| Failure::execution(format!("Flow '{IMAGE_FLOW}' is not registered")))?;

    info!(kind = %kind, id, references = references.len(), "Generating image");
    let input = json!({
        "prompt": prompt,
        "references": references,
        "history": cx.turns,
    });
    let output = flow.run(input, &cx.call_context()).await?;
    let image: GeneratedImage = serde_json::from_value(output)?;

    if cx.settings.persist_images
        && let Some(url) = &image.url
    {
        save_image_url(cx, kind, id, url).await;
    }

    Ok(AssistResult::Image {
        target_type: kind,
        target_id: id.to_string(),
        prompt,
        image,
    })
}

/// The image was produced either way, so a failed write is only logged.
async fn save_image_url(cx: &HandlerContext<'_>, kind: ContentKind, id: &str, url: &str) {
    let image_url = Some(url.to_string());
    let saved = match kind {
        ContentKind::Panel => cx
            .store
            .update_panel(id, PanelPatch { image_url, ..Default::default() })
            .await
            .map(|p| p.is_some()),
        ContentKind::Character => cx
            .store
            .update_character(id, CharacterPatch { image_url, ..Default::default() })
            .await
            .map(|c| c.is_some()),
        _ => Ok(false),
    };
    match saved {
        Ok(true) => info!(kind = %kind, id, "Saved image URL"),
        Ok(false) => warn!(kind = %kind, id, "Image target vanished before the URL could be saved"),
        Err(e) => warn!(kind = %kind, id, error = %e, "Could not save image URL"),
    }
}
