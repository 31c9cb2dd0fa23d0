//! # PanelForge Core
//!
//! Domain types, traits, and error definitions for the PanelForge prompt
//! orchestration runtime. This crate has **zero framework dependencies**;
//! it defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator is defined as a trait here: the LLM [`Provider`],
//! the [`ModelAdapter`] that prompts call through, the [`ContentStore`]
//! holding the manga tree, and executable [`Tool`]s. Implementations live
//! in their respective crates, so tests can swap in scripted stand-ins.

pub mod action;
pub mod adapter;
pub mod content;
pub mod context;
pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use action::{ActionDescriptor, ActionKind, DescriptorError, SelectedNode};
pub use adapter::{GenerateRequest, GenerationParams, ImageFetcher, ModelAdapter};
pub use content::{ContentKind, ContentStore, Project};
pub use context::{ContextFrame, ContextMap, ContextStore};
pub use error::{BoxError, CapabilityError, Error, ErrorKind, FlowError, Result};
pub use message::{ChatTurn, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
pub use tool::Tool;
