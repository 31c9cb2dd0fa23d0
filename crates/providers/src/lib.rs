//! LLM provider implementations for PanelForge.
//!
//! All providers implement the `panelforge_core::Provider` trait. The
//! router picks one from configuration and [`ProviderAdapter`] turns it
//! into the model adapter that prompts talk to.

pub mod adapter;
pub mod fetch;
pub mod mock;
pub mod openai_compat;
pub mod router;

pub use adapter::ProviderAdapter;
pub use fetch::HttpImageFetcher;
pub use mock::SequentialMockProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config};
