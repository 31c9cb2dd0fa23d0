//! HTTP API v1.
//!
//! Endpoints:
//!
//! - `POST /v1/assist`                 Run one assistant request
//! - `POST /v1/render`                 Render a template against JSON data
//! - `GET  /v1/projects/{id}/context`  Inspect a context projection
//! - `GET  /v1/capabilities`           List registered capabilities

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use panelforge_context::{ContextMode, ContextView, context_view};
use panelforge_planner::{AssistRequest, AssistResult};
use panelforge_template::Template;

use crate::SharedState;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedState) -> Router {
    Router::new()
        .route("/assist", post(assist_handler))
        .route("/render", post(render_handler))
        .route("/projects/{id}/context", get(context_handler))
        .route("/capabilities", get(capabilities_handler))
        .with_state(state)
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RenderRequest {
    template: String,
    #[serde(default)]
    data: Value,
    /// Reject malformed templates instead of rendering them leniently.
    #[serde(default)]
    strict: bool,
}

#[derive(Serialize, Deserialize)]
struct RenderResponse {
    output: String,
}

#[derive(Deserialize)]
struct ContextQuery {
    #[serde(default)]
    mode: ContextMode,
    scene: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct CapabilityDto {
    name: String,
    kind: String,
}

#[derive(Serialize, Deserialize)]
struct CapabilityListResponse {
    capabilities: Vec<CapabilityDto>,
    count: usize,
}

#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: error.into() }))
}

// ── Handlers ──────────────────────────────────────────────────────────────

/// Always 200: failures travel inside the result as `kind: "error"`.
async fn assist_handler(State(state): State<SharedState>, Json(request): Json<AssistRequest>) -> Json<AssistResult> {
    info!(project = %request.project_id, "v1/assist request");
    let result = state.assistant.assist(request).await;
    info!(kind = result.kind(), "v1/assist finished");
    Json(result)
}

async fn render_handler(Json(payload): Json<RenderRequest>) -> Result<Json<RenderResponse>, ApiError> {
    let template = if payload.strict {
        Template::parse(&payload.template).map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?
    } else {
        Template::parse_lenient(&payload.template)
    };
    Ok(Json(RenderResponse {
        output: template.render(&payload.data),
    }))
}

async fn context_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<ContextQuery>,
) -> Result<Json<ContextView>, ApiError> {
    let project = state
        .store
        .get_project(&id)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Project '{id}' not found")))?;

    let view = context_view(&project, query.mode, query.scene.as_deref()).ok_or_else(|| {
        let scene = query.scene.as_deref().unwrap_or_default();
        api_error(StatusCode::NOT_FOUND, format!("Scene '{scene}' not found"))
    })?;
    Ok(Json(view))
}

async fn capabilities_handler(State(state): State<SharedState>) -> Json<CapabilityListResponse> {
    let registry = state.assistant.registry();
    let capabilities: Vec<CapabilityDto> = registry
        .names()
        .into_iter()
        .filter_map(|name| registry.get(name))
        .map(|c| CapabilityDto {
            name: c.name().to_string(),
            kind: c.kind().to_string(),
        })
        .collect();

    Json(CapabilityListResponse {
        count: capabilities.len(),
        capabilities,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────
