//! Integration tests for glm-engine core traits and types.
//!
//! Validates:
//! - ChatEngine can be implemented and used through a trait object
//! - Snapshot streams are pull-based and finite
//! - Messages serialize with only their non-null fields
//! - Error types display with context

use futures::StreamExt;
use glm_engine::*;
use serde_json::json;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Mock Backend
// ---------------------------------------------------------------------------

/// Replays a fixed list of cumulative texts.
struct ReplayEngine {
    texts: Vec<&'static str>,
}

impl ChatEngine for ReplayEngine {
    fn generate(&self, _params: &GenerationParams) -> Result<GenerationSnapshot> {
        let text = self.texts.last().copied().unwrap_or_default();
        Ok(GenerationSnapshot::new(text, TokenUsage::new(3, self.texts.len())))
    }

    fn generate_stream(&self, _params: GenerationParams) -> Result<SnapshotStream> {
        let snapshots: Vec<Result<GenerationSnapshot>> = self
            .texts
            .iter()
            .enumerate()
            .map(|(i, text)| Ok(GenerationSnapshot::new(*text, TokenUsage::new(3, i + 1))))
            .collect();
        Ok(futures::stream::iter(snapshots).boxed())
    }
}

fn params() -> GenerationParams {
    GenerationParams {
        messages: vec![ChatMessage::user("hi")],
        temperature: 0.7,
        top_p: 1.0,
        repetition_penalty: 1.1,
        max_tokens: 16,
        stop: vec![],
        stop_token_ids: vec![],
        echo: false,
        stream: true,
        chunk: true,
        with_function_call: false,
    }
}

// ---------------------------------------------------------------------------
// Trait objects
// ---------------------------------------------------------------------------

#[test]
fn chat_engine_works_as_trait_object() {
    let engine: Arc<dyn ChatEngine> = Arc::new(ReplayEngine {
        texts: vec!["H", "He", "Hello"],
    });
    let out = engine.generate(&params()).unwrap();
    assert_eq!(out.text, "Hello");
    assert_eq!(out.usage.total_tokens, 6);
}

#[tokio::test]
async fn snapshot_stream_yields_in_order() {
    let engine = ReplayEngine {
        texts: vec!["H", "He", "Hello"],
    };
    let texts: Vec<String> = engine
        .generate_stream(params())
        .unwrap()
        .map(|s| s.unwrap().text)
        .collect()
        .await;
    assert_eq!(texts, vec!["H", "He", "Hello"]);
}

#[test]
fn traits_are_send_and_sync() {
    fn assert_send_sync<T: ?Sized + Send + Sync>() {}
    assert_send_sync::<dyn ChatEngine>();
    assert_send_sync::<dyn ResponseProcessor>();
    assert_send_sync::<dyn Tokenizer>();
    assert_send_sync::<dyn Embedder>();
    assert_send_sync::<dyn ModelLoader>();
}

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

#[test]
fn token_usage_new_sums_total() {
    let usage = TokenUsage::new(5, 10);
    assert_eq!(usage.total_tokens, 15);
}

#[test]
fn message_serializes_non_null_fields_only() {
    let msg = ChatMessage::user("hi");
    assert_eq!(
        serde_json::to_value(&msg).unwrap(),
        json!({"role": "user", "content": "hi"})
    );

    let sys = ChatMessage::system("").with_tools(vec![json!({"name": "weather"})]);
    assert_eq!(
        serde_json::to_value(&sys).unwrap(),
        json!({"role": "system", "content": "", "tools": [{"name": "weather"}]})
    );
}

#[test]
fn message_content_may_be_absent() {
    let msg: ChatMessage = serde_json::from_value(json!({"role": "observation"})).unwrap();
    assert_eq!(msg.role, Role::Observation);
    assert!(msg.content.is_none());
    assert_eq!(msg.text(), "");
}

#[test]
fn unknown_role_is_rejected() {
    let res: std::result::Result<ChatMessage, _> =
        serde_json::from_value(json!({"role": "tool", "content": "x"}));
    assert!(res.is_err());
}

#[test]
fn roles_use_lowercase_wire_names() {
    let roles = [Role::User, Role::Assistant, Role::System, Role::Observation];
    let names = ["user", "assistant", "system", "observation"];
    for (role, name) in roles.into_iter().zip(names) {
        assert_eq!(serde_json::to_value(role).unwrap(), json!(name));
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn error_display_carries_context() {
    let err = EngineError::Inference("out of memory".to_string());
    assert_eq!(err.to_string(), "Inference failed: out of memory");

    let err = EngineError::Processing("bad tool_call".to_string());
    assert!(err.to_string().contains("bad tool_call"));
}
