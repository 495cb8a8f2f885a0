//! Function-call resolution for non-streaming replies.

use glm_engine::{ChatMessage, ResolvedContent, ResponseProcessor};

use crate::error::ServerError;
use crate::models::FinishReason;

/// The assistant turn to return, with its finish reason.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReply {
    pub message: ChatMessage,
    pub finish_reason: FinishReason,
    /// Conversation including the resolved turn; only set when resolution ran.
    pub history: Option<Vec<ChatMessage>>,
}

impl ResolvedReply {
    /// Plain reply, no resolution.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            message: ChatMessage::assistant(content),
            finish_reason: FinishReason::Stop,
            history: None,
        }
    }
}

/// Resolve `text` through `processor` when `resolve_calls` is set.
///
/// Structured calls are returned as JSON text with
/// `finish_reason=function_call`; prose keeps `finish_reason=stop`.
pub fn resolve_reply(
    processor: &dyn ResponseProcessor,
    text: String,
    messages: &[ChatMessage],
    resolve_calls: bool,
) -> Result<ResolvedReply, ServerError> {
    if !resolve_calls {
        return Ok(ResolvedReply::text(text));
    }

    let resolution = processor.resolve(&text, messages.to_vec())?;
    let (content, finish_reason) = match resolution.content {
        ResolvedContent::Text(prose) => (prose, FinishReason::Stop),
        ResolvedContent::Call(call) => (call.to_string(), FinishReason::FunctionCall),
    };

    Ok(ResolvedReply {
        message: ChatMessage::assistant(content),
        finish_reason,
        history: Some(resolution.history),
    })
}
