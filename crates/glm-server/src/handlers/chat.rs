//! Chat completion handler.

use axum::{extract::State, response::IntoResponse, Json};
use glm_engine::EngineError;
use tokio::task;

use crate::{
    assembler::ResponseAssembler,
    error::ServerError,
    models::{ChatCompletionRequest, Usage},
    normalize, resolver,
    state::AppState,
    streaming,
};

/// Handle chat completion requests (streaming and non-streaming).
pub async fn handle_chat_completion(
    State(state): State<AppState>,
    Json(req): Json<ChatCompletionRequest>,
) -> Result<axum::response::Response, ServerError> {
    let engine = state.chat_engine()?;
    let params = normalize::normalize(&req)?;
    tracing::debug!(
        messages = params.messages.len(),
        max_tokens = params.max_tokens,
        stream = params.stream,
        chunk = params.chunk,
        with_function_call = params.with_function_call,
        "normalized chat request"
    );

    let assembler = ResponseAssembler::new(state.config.model_name.clone());

    if params.stream {
        let chunk = params.chunk;
        let snapshots = engine.generate_stream(params)?;
        return Ok(streaming::stream_chat_completion(assembler, snapshots, chunk).into_response());
    }

    let resolve_calls = params.with_function_call && req.return_function_call.unwrap_or(false);
    let generation = task::spawn_blocking(move || engine.generate(&params))
        .await
        .map_err(|e| EngineError::Inference(format!("task join: {e}")))??;

    let reply = resolver::resolve_reply(
        state.processor.as_ref(),
        generation.text,
        &req.messages,
        resolve_calls,
    )?;

    let mut usage = Usage::default();
    usage.merge(&generation.usage);

    Ok(Json(assembler.completion(reply, usage)).into_response())
}
