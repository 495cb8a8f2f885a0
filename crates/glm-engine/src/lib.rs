//! # glm-engine
//!
//! The "narrow waist" of the glm-serve stack. Defines the collaborator traits
//! the HTTP layer is written against ([`ChatEngine`], [`ResponseProcessor`],
//! [`Tokenizer`], [`Embedder`], [`ModelLoader`]) and the request-scoped value
//! types that flow between them.
//!
//! ## Design Notes
//!
//! ### Shared handles
//! All traits take `&self` and are `Send + Sync`. Loaded models are created
//! once at startup, wrapped in `Arc`, and shared read-only by every request.
//! Implementations that need to serialize access to an accelerator do so
//! internally.
//!
//! ### Snapshots
//! Streaming generation yields cumulative [`GenerationSnapshot`]s: each
//! snapshot's text extends the previous one. Consumers diff consecutive
//! snapshots to recover incremental fragments.

use std::sync::Arc;

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Token ID type.
pub type TokenId = u32;

/// Pull-based sequence of cumulative snapshots for one streaming request.
///
/// Finite and not restartable. Dropping the stream abandons generation.
pub type SnapshotStream = BoxStream<'static, Result<GenerationSnapshot>>;

/// Top-level error type for all collaborator operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),
    #[error("Tokenization failed: {0}")]
    Tokenization(String),
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Embedding failed: {0}")]
    Embedding(String),
    #[error("Response processing failed: {0}")]
    Processing(String),
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Observation,
}

/// One turn of a conversation.
///
/// Unset optional fields are omitted when serialized, so a serialized message
/// carries only its non-null fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    /// Tool definitions; only meaningful on a leading system message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            metadata: None,
            tools: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Message text, empty when the content field is absent.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// Immutable generation settings built once per request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
    /// Maximum number of completion tokens.
    pub max_tokens: usize,
    /// Stop strings; generation ends at the first occurrence of any of them.
    pub stop: Vec<String>,
    pub stop_token_ids: Vec<TokenId>,
    /// Whether the prompt is echoed back in the generated text.
    pub echo: bool,
    pub stream: bool,
    /// Streaming sub-mode: emit suffix fragments instead of full text.
    pub chunk: bool,
    /// Tool-augmented parsing; set when the conversation opens with a
    /// system message carrying tool definitions.
    pub with_function_call: bool,
}

/// Token accounting reported by the generation engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

impl TokenUsage {
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Cumulative decoding state at one generation step.
///
/// Also used as the single-shot generation result, i.e. the final snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSnapshot {
    pub text: String,
    pub usage: TokenUsage,
}

impl GenerationSnapshot {
    pub fn new(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            usage,
        }
    }
}

/// What the response processor made of the generated text.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedContent {
    /// Plain assistant prose.
    Text(String),
    /// A structured call payload (tool name and arguments).
    Call(Value),
}

/// Output of [`ResponseProcessor::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub content: ResolvedContent,
    /// Prior history with the resolved assistant turn(s) appended.
    pub history: Vec<ChatMessage>,
}

/// Specification for loading a model.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    /// Identifier reported to clients.
    pub model_id: String,
    /// Weights location (hub id or filesystem path).
    pub path: String,
    /// Number of accelerators to spread the weights over.
    pub device_count: usize,
}

/// Causal language model generation.
pub trait ChatEngine: Send + Sync {
    /// Run generation to completion and return the final snapshot.
    fn generate(&self, params: &GenerationParams) -> Result<GenerationSnapshot>;

    /// Start generation and return the cumulative snapshot sequence.
    fn generate_stream(&self, params: GenerationParams) -> Result<SnapshotStream>;
}

/// Classifies completed generation text as prose or a structured call.
pub trait ResponseProcessor: Send + Sync {
    fn resolve(&self, text: &str, history: Vec<ChatMessage>) -> Result<Resolution>;
}

/// Text tokenization for the chat model.
pub trait Tokenizer: Send + Sync {
    /// Split text into token strings.
    fn tokenize(&self, text: &str) -> Result<Vec<String>>;

    /// Encode text into token IDs, truncated to `max_length`.
    fn encode(&self, text: &str, max_length: usize) -> Result<Vec<TokenId>>;
}

/// Sentence embedding model.
pub trait Embedder: Send + Sync {
    /// Encode a batch of texts, one vector per input.
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Startup-time model construction and shutdown-time resource release.
pub trait ModelLoader: Send + Sync {
    /// Load the chat model across `spec.device_count` devices.
    fn load(&self, spec: &ModelSpec) -> Result<Arc<dyn ChatEngine>>;

    /// Load the tokenizer paired with the chat model.
    fn load_tokenizer(&self, spec: &ModelSpec) -> Result<Arc<dyn Tokenizer>>;

    /// Load a sentence embedding model by identifier.
    fn load_embedder(&self, model_id: &str) -> Result<Arc<dyn Embedder>>;

    /// Free accelerator memory held by loaded models.
    fn release(&self) {}
}
