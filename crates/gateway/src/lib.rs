//! HTTP API gateway for PanelForge.
//!
//! Exposes a health check and the v1 API: assistant requests, template
//! rendering, context inspection and the capability listing.
//!
//! Built on Axum for high performance async HTTP.

pub mod api_v1;
pub mod runtime;

pub use runtime::{Runtime, RuntimeError};

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, extract::State, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use panelforge_core::ContentStore;
use panelforge_planner::Assistant;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub assistant: Arc<Assistant>,
    pub store: Arc<dyn ContentStore>,
}

impl From<&Runtime> for GatewayState {
    fn from(runtime: &Runtime) -> Self {
        Self {
            assistant: runtime.assistant.clone(),
            store: runtime.store.clone(),
        }
    }
}

pub type SharedState = Arc<GatewayState>;

/// Build the full router.
///
/// Layers applied:
/// - CORS restricted to the local frontend origin
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("http://localhost:8080"))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_handler))
        .with_state(state.clone())
        .nest("/v1", api_v1::v1_router(state))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(host: &str, port: u16, state: SharedState) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{host}:{port}");
    let app = build_router(state);

    info!(%addr, "Gateway listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    capabilities: usize,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        capabilities: state.assistant.registry().len(),
    })
}

/// State over the sample project whose model answers `reply` once.
#[cfg(test)]
pub(crate) fn test_state(reply: &str) -> SharedState {
    use panelforge_providers::{ProviderAdapter, SequentialMockProvider};
    use panelforge_store::InMemoryContentStore;
    use panelforge_store::fixtures::sample_project;

    let config = panelforge_config::AppConfig::default();
    let store = Arc::new(InMemoryContentStore::with_projects(vec![sample_project()]));
    let adapter = Arc::new(ProviderAdapter::new(
        Arc::new(SequentialMockProvider::single_text(reply)),
        "mock-model",
    ));
    let runtime = Runtime::with_parts(&config, store, adapter).unwrap();
    Arc::new(GatewayState::from(&runtime))
}
