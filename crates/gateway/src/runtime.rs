//! Wiring: build the assistant and its collaborators from configuration.

use std::sync::Arc;
use std::time::Duration;

use panelforge_config::AppConfig;
use panelforge_core::error::{ProviderError, StoreError};
use panelforge_core::{CapabilityError, ContentStore, ContextStore, ModelAdapter};
use panelforge_planner::{Assistant, AssistantDeps, AssistantSettings};
use panelforge_providers::{HttpImageFetcher, ProviderAdapter};
use panelforge_store::FileContentStore;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Content store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("Model provider unavailable: {0}")]
    Provider(#[from] ProviderError),

    #[error("Capability setup failed: {0}")]
    Capability(#[from] CapabilityError),
}

/// A ready-to-use assistant plus the store it works on.
#[derive(Clone)]
pub struct Runtime {
    pub assistant: Arc<Assistant>,
    pub store: Arc<dyn ContentStore>,
    /// Process-wide context, seeded from the `[context]` table
    pub context: Arc<ContextStore>,
}

impl Runtime {
    /// File-backed store and the configured provider.
    pub fn from_config(config: &AppConfig) -> Result<Self, RuntimeError> {
        let path = config.store.resolved_path();
        let store = Arc::new(FileContentStore::open(&path)?);
        info!(path = %path.display(), "Content store opened");
        let adapter = Arc::new(ProviderAdapter::from_config(config)?);
        Self::with_parts(config, store, adapter)
    }

    /// Assemble around an existing store and model adapter.
    pub fn with_parts(
        config: &AppConfig,
        store: Arc<dyn ContentStore>,
        adapter: Arc<dyn ModelAdapter>,
    ) -> Result<Self, RuntimeError> {
        let context = Arc::new(ContextStore::with_values(config.context.clone()));
        let fetcher = Arc::new(HttpImageFetcher::new(Duration::from_secs(config.image.fetch_timeout_secs)));
        let assistant = Assistant::new(
            AssistantDeps {
                store: store.clone(),
                adapter,
                fetcher,
                context: context.clone(),
            },
            AssistantSettings::from(&config.assistant),
        )?;

        Ok(Self {
            assistant: Arc::new(assistant),
            store,
            context,
        })
    }
}
