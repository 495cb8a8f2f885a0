//! Wraps resolved replies and delta events into response envelopes.

use chrono::Utc;
use uuid::Uuid;

use crate::models::{
    ChatChoice, ChatChoiceDelta, ChatCompletionChunk, ChatCompletionResponse, Usage,
};
use crate::resolver::ResolvedReply;

pub const COMPLETION_OBJECT: &str = "chat.completion";
pub const CHUNK_OBJECT: &str = "chat.completion.chunk";

/// Envelope builder for one request. All chunks of a stream share its id and
/// creation timestamp.
#[derive(Debug, Clone)]
pub struct ResponseAssembler {
    id: String,
    created: u64,
    model: String,
}

impl ResponseAssembler {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            id: format!("chatcmpl-{}", Uuid::new_v4()),
            created: Utc::now().timestamp() as u64,
            model: model.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn chunk(&self, delta: ChatChoiceDelta) -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: self.id.clone(),
            object: CHUNK_OBJECT.to_string(),
            created: self.created,
            model: self.model.clone(),
            choices: vec![delta],
        }
    }

    pub fn completion(&self, reply: ResolvedReply, usage: Usage) -> ChatCompletionResponse {
        ChatCompletionResponse {
            id: self.id.clone(),
            object: COMPLETION_OBJECT.to_string(),
            created: self.created,
            model: self.model.clone(),
            choices: vec![ChatChoice {
                index: 0,
                message: reply.message,
                finish_reason: reply.finish_reason,
                history: reply.history,
            }],
            usage,
        }
    }
}
