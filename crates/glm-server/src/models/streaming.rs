//! Server-Sent Events (SSE) streaming types for chat completions.

use serde::{Deserialize, Serialize};

use crate::models::common::{FinishReason, Role};

/// Chat completion chunk for streaming responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<ChatChoiceDelta>,
}

/// One streamed delta event. `finish_reason` is always serialized, as `null`
/// until the closing event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatChoiceDelta {
    pub index: usize,
    pub delta: ChatDelta,
    pub finish_reason: Option<FinishReason>,
}

impl ChatChoiceDelta {
    /// Opening event announcing the assistant role.
    pub fn role(role: Role) -> Self {
        Self {
            index: 0,
            delta: ChatDelta {
                role: Some(role),
                content: Some(String::new()),
            },
            finish_reason: None,
        }
    }

    /// Content fragment event.
    pub fn content(fragment: impl Into<String>) -> Self {
        Self {
            index: 0,
            delta: ChatDelta {
                role: None,
                content: Some(fragment.into()),
            },
            finish_reason: None,
        }
    }

    /// Closing event with an empty delta.
    pub fn finish(reason: FinishReason) -> Self {
        Self {
            index: 0,
            delta: ChatDelta::default(),
            finish_reason: Some(reason),
        }
    }
}

/// Delta object containing incremental content. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}
