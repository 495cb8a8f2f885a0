//! # glm-runtime
//!
//! Concrete collaborators for the glm-engine traits:
//! - [`MockEngine`] / [`MockLoader`]: deterministic chat, tokenizer and
//!   embedding backends used by the server binary and the tests
//! - [`Glm3ResponseProcessor`]: parses ChatGLM3 assistant output into prose
//!   or tool calls

pub mod mock;
pub mod processor;

pub use mock::{HashingEmbedder, MockEngine, MockLoader, WhitespaceTokenizer};
pub use processor::Glm3ResponseProcessor;
