//! Embeddings handler.

use axum::{extract::State, Json};
use glm_engine::EngineError;
use tokio::task;

use crate::{
    error::ServerError,
    models::{EmbeddingRequest, EmbeddingResponse},
    state::AppState,
};

/// Handle embedding requests against the named (or default) encoder.
pub async fn handle_embedding(
    State(state): State<AppState>,
    Json(req): Json<EmbeddingRequest>,
) -> Result<Json<EmbeddingResponse>, ServerError> {
    let model = req
        .model
        .unwrap_or_else(|| state.config.default_embedding_model.clone());
    let encoder = state
        .encoders
        .get(&model)
        .ok_or_else(|| ServerError::InvalidRequest(format!("unknown embedding model: {model}")))?;

    let prompt = req.prompt;
    let data = task::spawn_blocking(move || encoder.encode(&prompt))
        .await
        .map_err(|e| EngineError::Embedding(format!("task join: {e}")))??;

    Ok(Json(EmbeddingResponse {
        data,
        model,
        object: "embedding".to_string(),
    }))
}
