//! Tokenize request/response types.

use glm_engine::TokenId;
use serde::{Deserialize, Serialize};

use crate::models::chat::SCHEMA_MAX_TOKENS;

#[derive(Debug, Deserialize)]
pub struct TokenizeRequest {
    pub prompt: String,
    /// Truncation length for `tokenIds`.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

fn default_max_tokens() -> usize {
    SCHEMA_MAX_TOKENS
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenizeResponse {
    #[serde(rename = "tokenIds")]
    pub token_ids: Vec<TokenId>,
    pub tokens: Vec<String>,
    pub model: String,
    pub object: String,
}
