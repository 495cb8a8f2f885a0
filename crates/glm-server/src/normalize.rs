//! Canonicalizes a chat request into engine generation parameters.

use glm_engine::{ChatMessage, GenerationParams, Role};

use crate::error::ServerError;
use crate::models::chat::{
    ChatCompletionRequest, StopSequences, DEFAULT_REPETITION_PENALTY, DEFAULT_TEMPERATURE,
    DEFAULT_TOP_P,
};

/// Generation budget used when `max_tokens` is null or zero.
///
/// Deliberately differs from the schema default of 4096, which only applies
/// when the field is omitted.
pub const FALLBACK_MAX_TOKENS: usize = 1024;

/// Validate `req` and build its [`GenerationParams`].
pub fn normalize(req: &ChatCompletionRequest) -> Result<GenerationParams, ServerError> {
    let last = req
        .messages
        .last()
        .ok_or_else(|| ServerError::InvalidRequest("messages must not be empty".to_string()))?;
    if last.role == Role::Assistant {
        return Err(ServerError::InvalidRequest(
            "last message must not be from the assistant".to_string(),
        ));
    }

    Ok(GenerationParams {
        messages: req.messages.clone(),
        temperature: req.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        top_p: req.top_p.unwrap_or(DEFAULT_TOP_P),
        repetition_penalty: req.repetition_penalty.unwrap_or(DEFAULT_REPETITION_PENALTY),
        max_tokens: req
            .max_tokens
            .filter(|&n| n > 0)
            .unwrap_or(FALLBACK_MAX_TOKENS),
        stop: stop_list(req.stop.clone()),
        stop_token_ids: req.stop_token_ids.clone().unwrap_or_default(),
        echo: false,
        stream: req.stream.unwrap_or(false),
        // A null `chunk` is falsy: full-text mode.
        chunk: req.chunk.unwrap_or(false),
        with_function_call: with_function_call(&req.messages),
    })
}

/// True iff the conversation opens with a system message carrying tools.
pub fn with_function_call(messages: &[ChatMessage]) -> bool {
    messages
        .first()
        .map(|m| m.role == Role::System && m.tools.is_some())
        .unwrap_or(false)
}

fn stop_list(stop: Option<StopSequences>) -> Vec<String> {
    match stop {
        None => Vec::new(),
        Some(StopSequences::Single(s)) if s.is_empty() => Vec::new(),
        Some(StopSequences::Single(s)) => vec![s],
        Some(StopSequences::Multiple(list)) => list,
    }
}
