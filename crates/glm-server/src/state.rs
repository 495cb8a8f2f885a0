//! Application state and configuration.

use std::collections::HashMap;
use std::sync::Arc;

use glm_engine::{
    ChatEngine, Embedder, ModelLoader, ModelSpec, ResponseProcessor, Result, Tokenizer,
};

use crate::configuration::Settings;
use crate::error::ServerError;

/// Application state shared across handlers.
///
/// Built once at startup; handlers only read from it.
#[derive(Clone)]
pub struct AppState {
    /// Chat engine; `None` when no accelerator was available at startup.
    pub chat: Option<Arc<dyn ChatEngine>>,
    /// Tokenizer paired with the chat model.
    pub tokenizer: Option<Arc<dyn Tokenizer>>,
    /// Tool-call classification for non-streaming replies.
    pub processor: Arc<dyn ResponseProcessor>,
    /// Sentence encoders keyed by model identifier.
    pub encoders: Arc<EncoderRegistry>,
    /// Server configuration.
    pub config: ServerConfig,
}

/// Request-time configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Chat model name to report in API responses.
    pub model_name: String,
    /// Encoder used when an embedding request names no model.
    pub default_embedding_model: String,
}

impl AppState {
    /// Load every model named in `settings` through `loader`.
    ///
    /// The chat engine is only loaded when `device_count > 0`.
    pub fn load(
        settings: &Settings,
        loader: &dyn ModelLoader,
        processor: Arc<dyn ResponseProcessor>,
    ) -> Result<Self> {
        let spec = ModelSpec {
            model_id: settings.model.name.clone(),
            path: settings.model.path.clone(),
            device_count: settings.model.device_count,
        };

        let tokenizer = loader.load_tokenizer(&spec)?;
        let chat = if spec.device_count > 0 {
            tracing::info!(devices = spec.device_count, "GPU mode");
            Some(loader.load(&spec)?)
        } else {
            tracing::warn!("CPU mode, chat API not available");
            None
        };

        let mut encoders = EncoderRegistry::default();
        for model_id in &settings.embedding.models {
            encoders.insert(model_id.clone(), loader.load_embedder(model_id)?);
        }

        Ok(Self {
            chat,
            tokenizer: Some(tokenizer),
            processor,
            encoders: Arc::new(encoders),
            config: ServerConfig {
                model_name: settings.model.name.clone(),
                default_embedding_model: settings.embedding.default_model.clone(),
            },
        })
    }

    /// The chat engine, if chat is available.
    pub fn chat_engine(&self) -> std::result::Result<Arc<dyn ChatEngine>, ServerError> {
        match (&self.chat, &self.tokenizer) {
            (Some(chat), Some(_)) => Ok(chat.clone()),
            _ => Err(ServerError::ServiceUnavailable(
                "chat API not available".to_string(),
            )),
        }
    }

    pub fn tokenizer(&self) -> std::result::Result<Arc<dyn Tokenizer>, ServerError> {
        self.tokenizer.clone().ok_or_else(|| {
            ServerError::ServiceUnavailable("API tokenize not available".to_string())
        })
    }
}

/// Embedding models keyed by identifier, in registration order.
#[derive(Default)]
pub struct EncoderRegistry {
    encoders: HashMap<String, Arc<dyn Embedder>>,
    order: Vec<String>,
}

impl EncoderRegistry {
    pub fn insert(&mut self, model_id: String, encoder: Arc<dyn Embedder>) {
        if self.encoders.insert(model_id.clone(), encoder).is_none() {
            self.order.push(model_id);
        }
    }

    pub fn get(&self, model_id: &str) -> Option<Arc<dyn Embedder>> {
        self.encoders.get(model_id).cloned()
    }

    /// Registered identifiers, in registration order.
    pub fn model_ids(&self) -> &[String] {
        &self.order
    }
}
