//! Error types for the PanelForge domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The top-level error type for all PanelForge operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Content store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Capability errors ---
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by user-supplied capability implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Tool loop exceeded {max_iterations} iterations")]
    ToolLoopExceeded { max_iterations: u32 },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Parent {kind} not found: {id}")]
    MissingParent { kind: String, id: String },

    #[error("Corrupted content file: {0}")]
    Corrupted(String),
}

/// Coarse classification of a [`CapabilityError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Definition,
    Validation,
    NotFound,
    Execution,
}

/// Which side of a capability call failed schema validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStage {
    Input,
    Output,
}

impl std::fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationStage::Input => f.write_str("input"),
            ValidationStage::Output => f.write_str("output"),
        }
    }
}

/// The single internal error type for tools, prompts, and flows.
///
/// Each capability kind converts this into its own external shape at the
/// call boundary (error text, `None`, or a wrapped [`FlowError`]).
#[derive(Debug, Clone, Error)]
pub enum CapabilityError {
    #[error("invalid definition for '{name}': {reason}")]
    Definition { name: String, reason: String },

    #[error("{stage} validation failed for '{name}': {reason}")]
    Validation {
        name: String,
        stage: ValidationStage,
        reason: String,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("'{name}' failed: {reason}")]
    Execution { name: String, reason: String },
}

impl CapabilityError {
    pub fn definition(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Definition {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn execution(name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Execution {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CapabilityError::Definition { .. } => ErrorKind::Definition,
            CapabilityError::Validation { .. } => ErrorKind::Validation,
            CapabilityError::NotFound { .. } => ErrorKind::NotFound,
            CapabilityError::Execution { .. } => ErrorKind::Execution,
        }
    }

    /// Lift an implementation error into a capability error.
    ///
    /// A boxed `CapabilityError` keeps its kind; anything else becomes an
    /// execution failure attributed to `name`.
    pub fn from_boxed(name: &str, err: BoxError) -> Self {
        match err.downcast::<CapabilityError>() {
            Ok(inner) => *inner,
            Err(other) => Self::execution(name, other),
        }
    }
}

/// A flow failure as seen by the flow's caller.
#[derive(Debug, Clone, Error)]
#[error("Flow '{flow}' failed: {source}")]
pub struct FlowError {
    pub flow: String,
    #[source]
    pub source: CapabilityError,
}

impl FlowError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn capability_error_kinds() {
        assert_eq!(
            CapabilityError::definition("t", "missing description").kind(),
            ErrorKind::Definition
        );
        assert_eq!(
            CapabilityError::not_found("scene", "s-9").kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn boxed_capability_error_keeps_kind() {
        let boxed: BoxError = Box::new(CapabilityError::not_found("panel", "p-1"));
        let err = CapabilityError::from_boxed("update_panel", boxed);
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let boxed: BoxError = "disk on fire".into();
        let err = CapabilityError::from_boxed("update_panel", boxed);
        assert_eq!(err.kind(), ErrorKind::Execution);
        assert!(err.to_string().contains("update_panel"));
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn flow_error_names_the_flow() {
        let err = FlowError {
            flow: "generate_scene".into(),
            source: CapabilityError::execution("generate_scene", "model unavailable"),
        };
        let text = err.to_string();
        assert!(text.starts_with("Flow 'generate_scene' failed"));
        assert!(text.contains("model unavailable"));
    }
}
