//! OpenAI-compatible request/response types.

pub mod catalog;
pub mod chat;
pub mod common;
pub mod embeddings;
pub mod streaming;
pub mod tokenize;

pub use catalog::{ModelCard, ModelList};
pub use chat::{ChatChoice, ChatCompletionRequest, ChatCompletionResponse, StopSequences};
pub use common::{ChatMessage, FinishReason, Role, Usage};
pub use embeddings::{EmbeddingRequest, EmbeddingResponse};
pub use streaming::{ChatChoiceDelta, ChatCompletionChunk, ChatDelta};
pub use tokenize::{TokenizeRequest, TokenizeResponse};
