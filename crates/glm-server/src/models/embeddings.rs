//! Embedding request/response types.

use serde::{Deserialize, Serialize};

/// Embedding request. `model` falls back to the server's default encoder.
#[derive(Debug, Deserialize)]
pub struct EmbeddingRequest {
    #[serde(default)]
    pub model: Option<String>,
    pub prompt: Vec<String>,
}

/// Embedding response: one vector per prompt, in request order.
#[derive(Debug, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<Vec<f32>>,
    pub model: String,
    pub object: String,
}
