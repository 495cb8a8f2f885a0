//! Health check handler.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// Handle health check requests. Includes model availability.
pub async fn handle_health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "chat_available": state.chat_engine().is_ok(),
        "tokenizer_available": state.tokenizer.is_some(),
        "embedding_models": state.encoders.model_ids(),
    }))
}
