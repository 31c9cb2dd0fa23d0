//! What callers send to the assistant and what they get back.

use panelforge_core::provider::GeneratedImage;
use panelforge_core::{CapabilityError, ChatTurn, ContentKind, ErrorKind, FlowError, SelectedNode};
use panelforge_core::error::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One user turn addressed to the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistRequest {
    pub project_id: String,
    pub user_input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_node: Option<SelectedNode>,
    /// Earlier turns, oldest first
    #[serde(default)]
    pub prev_chats: Vec<ChatTurn>,
}

impl AssistRequest {
    pub fn new(project_id: impl Into<String>, user_input: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            user_input: user_input.into(),
            selected_node: None,
            prev_chats: Vec::new(),
        }
    }

    pub fn with_selection(mut self, node: SelectedNode) -> Self {
        self.selected_node = Some(node);
        self
    }

    pub fn with_history(mut self, turns: Vec<ChatTurn>) -> Self {
        self.prev_chats = turns;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    NotFound,
    InvalidAction,
    ClassificationFailed,
    Unsupported,
    ExecutionFailed,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ErrorCode::NotFound => "notFound",
            ErrorCode::InvalidAction => "invalidAction",
            ErrorCode::ClassificationFailed => "classificationFailed",
            ErrorCode::Unsupported => "unsupported",
            ErrorCode::ExecutionFailed => "executionFailed",
        })
    }
}

/// The outcome of one request. Every path ends in one of these, errors
/// included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AssistResult {
    /// Text for the user, nothing changed
    Message { content: String },

    Generated {
        content_type: ContentKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<String>,
        data: Value,
        /// IDs of stored items, empty unless generated content is persisted
        #[serde(default)]
        created_ids: Vec<String>,
    },

    Updated {
        content_type: ContentKind,
        content_id: String,
        message: String,
    },

    Image {
        target_type: ContentKind,
        target_id: String,
        prompt: String,
        image: GeneratedImage,
    },

    Error { code: ErrorCode, message: String },
}

impl AssistResult {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        AssistResult::Error {
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AssistResult::Error { .. })
    }

    /// Discriminator as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            AssistResult::Message { .. } => "message",
            AssistResult::Generated { .. } => "generated",
            AssistResult::Updated { .. } => "updated",
            AssistResult::Image { .. } => "image",
            AssistResult::Error { .. } => "error",
        }
    }

    /// One line for a chat transcript, fed back as the assistant's turn.
    pub fn summary(&self) -> String {
        match self {
            AssistResult::Message { content } => content.clone(),
            AssistResult::Generated {
                content_type,
                created_ids,
                ..
            } if !created_ids.is_empty() => {
                format!("Created {} {content_type}(s): {}", created_ids.len(), created_ids.join(", "))
            }
            AssistResult::Generated { content_type, .. } => format!("Drafted new {content_type} content."),
            AssistResult::Updated { message, .. } => message.clone(),
            AssistResult::Image {
                target_type,
                target_id,
                image,
                ..
            } => match &image.url {
                Some(url) => format!("Drew {target_type} {target_id}: {url}"),
                None => format!("Drew {target_type} {target_id}."),
            },
            AssistResult::Error { message, .. } => format!("Sorry, that failed: {message}"),
        }
    }
}

/// A handler failure on its way to becoming [`AssistResult::Error`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{code}: {message}")]
pub(crate) struct Failure {
    pub code: ErrorCode,
    pub message: String,
}

impl Failure {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(kind: ContentKind, id: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("No {kind} with id '{id}' in this project"))
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unsupported, message)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExecutionFailed, message)
    }
}

impl From<Failure> for AssistResult {
    fn from(failure: Failure) -> Self {
        AssistResult::Error {
            code: failure.code,
            message: failure.message,
        }
    }
}

impl From<StoreError> for Failure {
    fn from(err: StoreError) -> Self {
        Failure::execution(format!("Content store error: {err}"))
    }
}

impl From<CapabilityError> for Failure {
    fn from(err: CapabilityError) -> Self {
        let code = match err.kind() {
            ErrorKind::NotFound => ErrorCode::NotFound,
            _ => ErrorCode::ExecutionFailed,
        };
        Failure::new(code, err.to_string())
    }
}

impl From<FlowError> for Failure {
    fn from(err: FlowError) -> Self {
        let code = match err.kind() {
            ErrorKind::NotFound => ErrorCode::NotFound,
            _ => ErrorCode::ExecutionFailed,
        };
        Failure::new(code, err.to_string())
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Failure::execution(format!("Malformed data: {err}"))
    }
}
