//! # glm-server
//!
//! OpenAI-compatible HTTP API for a ChatGLM3 chat engine and sentence
//! embedding models.
//!
//! The chat path normalizes requests into generation parameters, then either
//! frames the engine's cumulative snapshots as Server-Sent Events or resolves
//! the completed text (optionally into a structured tool call) and returns a
//! single `chat.completion` object.

pub mod assembler;
pub mod configuration;
pub mod error;
pub mod framer;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod resolver;
pub mod server;
pub mod state;
pub mod streaming;

pub use configuration::Settings;
pub use error::ServerError;
pub use server::{create_router, run_server};
pub use state::{AppState, EncoderRegistry, ServerConfig};
