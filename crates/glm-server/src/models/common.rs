//! Common types used across chat, streaming and embedding models.

use glm_engine::TokenUsage;
use serde::{Deserialize, Serialize};

pub use glm_engine::{ChatMessage, Role};

/// Terminal classification of a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    FunctionCall,
}

/// Token usage statistics for a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub total_tokens: usize,
    pub completion_tokens: usize,
}

impl Usage {
    /// Add an engine-reported usage record field by field.
    pub fn merge(&mut self, reported: &TokenUsage) {
        self.prompt_tokens += reported.prompt_tokens;
        self.completion_tokens += reported.completion_tokens;
        self.total_tokens += reported.total_tokens;
    }
}

impl From<TokenUsage> for Usage {
    fn from(reported: TokenUsage) -> Self {
        let mut usage = Usage::default();
        usage.merge(&reported);
        usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_into_zeroed_copies_fields() {
        let mut usage = Usage::default();
        usage.merge(&TokenUsage {
            prompt_tokens: 5,
            completion_tokens: 10,
            total_tokens: 15,
        });
        assert_eq!(
            usage,
            Usage {
                prompt_tokens: 5,
                completion_tokens: 10,
                total_tokens: 15
            }
        );
    }

    #[test]
    fn merge_is_additive() {
        let mut usage = Usage::default();
        usage.merge(&TokenUsage {
            prompt_tokens: 5,
            completion_tokens: 10,
            total_tokens: 15,
        });
        usage.merge(&TokenUsage {
            prompt_tokens: 2,
            completion_tokens: 3,
            total_tokens: 5,
        });
        assert_eq!(usage.prompt_tokens, 7);
        assert_eq!(usage.completion_tokens, 13);
        assert_eq!(usage.total_tokens, 20);
    }

    #[test]
    fn from_token_usage_matches_single_merge() {
        let reported = TokenUsage::new(4, 6);
        assert_eq!(Usage::from(reported).total_tokens, 10);
    }

    #[test]
    fn finish_reason_wire_names() {
        assert_eq!(serde_json::to_value(FinishReason::Stop).unwrap(), json!("stop"));
        assert_eq!(serde_json::to_value(FinishReason::Length).unwrap(), json!("length"));
        assert_eq!(
            serde_json::to_value(FinishReason::FunctionCall).unwrap(),
            json!("function_call")
        );
    }
}
