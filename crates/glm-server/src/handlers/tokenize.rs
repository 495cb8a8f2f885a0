//! Tokenize handler.

use axum::{extract::State, Json};

use crate::{
    error::ServerError,
    models::{TokenizeRequest, TokenizeResponse},
    state::AppState,
};

pub async fn handle_tokenize(
    State(state): State<AppState>,
    Json(req): Json<TokenizeRequest>,
) -> Result<Json<TokenizeResponse>, ServerError> {
    let tokenizer = state.tokenizer()?;
    let tokens = tokenizer.tokenize(&req.prompt)?;
    let token_ids = tokenizer.encode(&req.prompt, req.max_tokens)?;

    Ok(Json(TokenizeResponse {
        token_ids,
        tokens,
        model: state.config.model_name.clone(),
        object: "tokenizer".to_string(),
    }))
}
