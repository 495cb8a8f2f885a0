//! Layered server settings: built-in defaults, an optional `glm.toml`, then
//! `GLM_`-prefixed environment variables (`GLM_SERVER__PORT=9000`).

use std::net::SocketAddr;

use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid socket address {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    /// Chat model identifier reported in every chat response.
    #[serde(default = "default_model_name")]
    pub name: String,
    #[serde(default = "default_model_path")]
    pub path: String,
    /// Accelerators to load the chat model on; 0 disables chat.
    #[serde(default = "default_device_count")]
    pub device_count: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            path: default_model_path(),
            device_count: default_device_count(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default = "default_embedding_model")]
    pub default_model: String,
    #[serde(default = "default_embedding_models")]
    pub models: Vec<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            default_model: default_embedding_model(),
            models: default_embedding_models(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .add_source(File::with_name("glm").required(false))
            .add_source(
                Environment::with_prefix("GLM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        tracing::debug!(?settings, "loaded configuration");
        Ok(settings)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8100
}

fn default_model_name() -> String {
    "chatglm3-6b-32k".to_string()
}

fn default_model_path() -> String {
    "THUDM/chatglm3-6b-32k".to_string()
}

fn default_device_count() -> usize {
    1
}

fn default_embedding_model() -> String {
    "text2vec-large-chinese".to_string()
}

fn default_embedding_models() -> Vec<String> {
    vec![
        "text2vec-large-chinese".to_string(),
        "text2vec-base-chinese-paraphrase".to_string(),
    ]
}
