//! Chat completion request/response types.

use crate::models::common::{ChatMessage, FinishReason, Usage};
use glm_engine::TokenId;
use serde::{Deserialize, Serialize};

/// Schema default for `max_tokens` advertised to clients.
pub const SCHEMA_MAX_TOKENS: usize = 4096;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 1.0;
pub const DEFAULT_REPETITION_PENALTY: f32 = 1.1;

/// `stop` accepts a single string or a list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StopSequences {
    Single(String),
    Multiple(Vec<String>),
}

/// Chat completion request.
///
/// Optional fields keep their explicit `null` so the normalizer can apply
/// falsy-value fallbacks.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_temperature")]
    pub temperature: Option<f32>,
    #[serde(default = "default_top_p")]
    pub top_p: Option<f32>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<usize>,
    #[serde(default)]
    pub stop: Option<StopSequences>,
    #[serde(default)]
    pub stream: Option<bool>,
    #[serde(default = "default_chunk")]
    pub chunk: Option<bool>,
    #[serde(default)]
    pub stop_token_ids: Option<Vec<TokenId>>,
    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: Option<f32>,
    /// Resolve tool calls into structured content on the non-streaming path.
    #[serde(default)]
    pub return_function_call: Option<bool>,
}

fn default_temperature() -> Option<f32> {
    Some(DEFAULT_TEMPERATURE)
}

fn default_top_p() -> Option<f32> {
    Some(DEFAULT_TOP_P)
}

fn default_max_tokens() -> Option<usize> {
    Some(SCHEMA_MAX_TOKENS)
}

fn default_chunk() -> Option<bool> {
    Some(true)
}

fn default_repetition_penalty() -> Option<f32> {
    Some(DEFAULT_REPETITION_PENALTY)
}

/// Chat completion choice.
#[derive(Debug, Clone, Serialize)]
pub struct ChatChoice {
    pub index: usize,
    pub message: ChatMessage,
    pub finish_reason: FinishReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<ChatMessage>>,
}

/// Chat completion response.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<ChatChoice>,
    pub usage: Usage,
}
