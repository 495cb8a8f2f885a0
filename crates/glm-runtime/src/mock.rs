//! Deterministic backends for local runs and tests.
//!
//! [`MockEngine`] echoes the last message back one whitespace-delimited word
//! per snapshot, honoring `max_tokens` and stop strings, so streaming and
//! non-streaming paths can be exercised without model weights.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use glm_engine::{
    ChatEngine, Embedder, GenerationParams, GenerationSnapshot, ModelLoader, ModelSpec, Result,
    SnapshotStream, TokenId, TokenUsage, Tokenizer,
};

/// Vocabulary size token IDs are folded into.
pub const VOCAB_SIZE: u32 = 65024;

/// Default embedding width for [`HashingEmbedder`].
pub const DEFAULT_EMBEDDING_DIM: usize = 64;

const REPLY_PREFIX: &str = "You said:";

/// Echo engine: replies `"You said: <last message>"`.
#[derive(Debug, Clone, Default)]
pub struct MockEngine;

impl MockEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute every cumulative snapshot for a request up front.
    fn snapshots(&self, params: &GenerationParams) -> Vec<GenerationSnapshot> {
        let prompt_tokens: usize = params
            .messages
            .iter()
            .map(|m| m.text().split_whitespace().count())
            .sum();
        let last = params.messages.last().map(|m| m.text()).unwrap_or_default();
        let reply = format!("{REPLY_PREFIX} {last}");
        let words: Vec<&str> = reply.split_whitespace().take(params.max_tokens).collect();

        let mut snapshots: Vec<GenerationSnapshot> = Vec::with_capacity(words.len());
        for produced in 1..=words.len() {
            let candidate = words[..produced].join(" ");
            let usage = TokenUsage::new(prompt_tokens, produced);

            match find_stop(&candidate, &params.stop) {
                Some(at) => {
                    let cut = candidate[..at].to_string();
                    let extends = snapshots
                        .last()
                        .map(|prev| cut.starts_with(&prev.text) && cut.len() > prev.text.len())
                        .unwrap_or(!cut.is_empty());
                    if extends {
                        snapshots.push(GenerationSnapshot::new(cut, usage));
                    }
                    break;
                }
                None => snapshots.push(GenerationSnapshot::new(candidate, usage)),
            }
        }
        snapshots
    }
}

/// Byte offset of the earliest stop string in `text`.
fn find_stop(text: &str, stop: &[String]) -> Option<usize> {
    stop.iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| text.find(s.as_str()))
        .min()
}

impl ChatEngine for MockEngine {
    fn generate(&self, params: &GenerationParams) -> Result<GenerationSnapshot> {
        let snapshots = self.snapshots(params);
        match snapshots.into_iter().last() {
            Some(last) => Ok(last),
            None => {
                let prompt = params
                    .messages
                    .iter()
                    .map(|m| m.text().split_whitespace().count())
                    .sum();
                Ok(GenerationSnapshot::new("", TokenUsage::new(prompt, 0)))
            }
        }
    }

    fn generate_stream(&self, params: GenerationParams) -> Result<SnapshotStream> {
        let snapshots = self.snapshots(&params);
        tracing::trace!(count = snapshots.len(), "mock engine streaming snapshots");
        Ok(futures::stream::iter(snapshots.into_iter().map(Ok)).boxed())
    }
}

/// 32-bit FNV-1a, used for stable token IDs and embedding buckets.
fn fnv1a(text: &str) -> u32 {
    text.bytes().fold(0x811c_9dc5u32, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    })
}

/// Splits on whitespace; token IDs are hashed into [`VOCAB_SIZE`].
#[derive(Debug, Clone, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        Ok(text.split_whitespace().map(str::to_string).collect())
    }

    fn encode(&self, text: &str, max_length: usize) -> Result<Vec<TokenId>> {
        Ok(text
            .split_whitespace()
            .take(max_length)
            .map(|word| fnv1a(word) % VOCAB_SIZE)
            .collect())
    }
}

/// Bag-of-words embedder: hashed word counts, L2 normalized.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for word in text.split_whitespace() {
            vector[fnv1a(word) as usize % self.dimension] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl Embedder for HashingEmbedder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// Loader handing out the mock backends; counts `release` calls.
#[derive(Debug)]
pub struct MockLoader {
    embedding_dim: usize,
    releases: AtomicUsize,
}

impl Default for MockLoader {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

impl MockLoader {
    pub fn new(embedding_dim: usize) -> Self {
        Self {
            embedding_dim,
            releases: AtomicUsize::new(0),
        }
    }

    /// How many times accelerator resources were released.
    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl ModelLoader for MockLoader {
    fn load(&self, spec: &ModelSpec) -> Result<Arc<dyn ChatEngine>> {
        tracing::info!(
            model = %spec.model_id,
            path = %spec.path,
            devices = spec.device_count,
            "loading mock chat engine"
        );
        Ok(Arc::new(MockEngine::new()))
    }

    fn load_tokenizer(&self, spec: &ModelSpec) -> Result<Arc<dyn Tokenizer>> {
        tracing::debug!(path = %spec.path, "loading whitespace tokenizer");
        Ok(Arc::new(WhitespaceTokenizer))
    }

    fn load_embedder(&self, model_id: &str) -> Result<Arc<dyn Embedder>> {
        tracing::debug!(model = model_id, dim = self.embedding_dim, "loading hashing embedder");
        Ok(Arc::new(HashingEmbedder::new(self.embedding_dim)))
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        tracing::info!("released accelerator resources");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glm_engine::ChatMessage;

    fn params(content: &str, max_tokens: usize, stop: &[&str]) -> GenerationParams {
        GenerationParams {
            messages: vec![ChatMessage::user(content)],
            temperature: 0.7,
            top_p: 1.0,
            repetition_penalty: 1.1,
            max_tokens,
            stop: stop.iter().map(|s| s.to_string()).collect(),
            stop_token_ids: vec![],
            echo: false,
            stream: false,
            chunk: true,
            with_function_call: false,
        }
    }

    #[test]
    fn snapshots_grow_by_prefix_extension() {
        let snaps = MockEngine::new().snapshots(&params("hello there", 16, &[]));
        let texts: Vec<&str> = snaps.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["You", "You said:", "You said: hello", "You said: hello there"]
        );
        for pair in snaps.windows(2) {
            assert!(pair[1].text.starts_with(&pair[0].text));
        }
    }

    #[test]
    fn generate_respects_max_tokens() {
        let out = MockEngine::new()
            .generate(&params("a b c d e", 3, &[]))
            .unwrap();
        assert_eq!(out.text, "You said: a");
        assert_eq!(out.usage, TokenUsage::new(5, 3));
    }

    #[test]
    fn generate_cuts_at_stop_string() {
        let out = MockEngine::new()
            .generate(&params("alpha beta gamma", 16, &["gamma"]))
            .unwrap();
        assert_eq!(out.text, "You said: alpha beta ");
    }

    #[test]
    fn generate_with_zero_budget_is_empty() {
        let out = MockEngine::new().generate(&params("hi", 0, &[])).unwrap();
        assert_eq!(out.text, "");
        assert_eq!(out.usage, TokenUsage::new(1, 0));
    }

    #[test]
    fn tokenizer_truncates_ids() {
        let tok = WhitespaceTokenizer;
        assert_eq!(tok.tokenize("a b c").unwrap(), vec!["a", "b", "c"]);
        let ids = tok.encode("a b c", 2).unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.iter().all(|&id| id < VOCAB_SIZE));
        assert_eq!(ids, tok.encode("a b", 8).unwrap());
    }

    #[test]
    fn embeddings_are_unit_length() {
        let emb = HashingEmbedder::new(16);
        let vectors = emb
            .encode(&["some text here".to_string(), String::new()])
            .unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].len(), 16);
        let norm: f32 = vectors[0].iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert!(vectors[1].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn loader_counts_releases() {
        let loader = MockLoader::default();
        assert_eq!(loader.release_count(), 0);
        loader.release();
        assert_eq!(loader.release_count(), 1);
    }
}
