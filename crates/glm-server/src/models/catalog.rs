//! Model listing types.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A model the server can answer for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCard {
    pub id: String,
    /// Capability tag: `embedding` or `chat.completion`.
    pub object: String,
    pub created: u64,
    pub owned_by: String,
    pub root: Option<String>,
    pub parent: Option<String>,
    pub permission: Option<Vec<Value>>,
}

impl ModelCard {
    pub fn new(id: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            object: object.into(),
            created: Utc::now().timestamp() as u64,
            owned_by: "owner".to_string(),
            root: None,
            parent: None,
            permission: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<ModelCard>,
}

impl ModelList {
    pub fn new(data: Vec<ModelCard>) -> Self {
        Self {
            object: "list".to_string(),
            data,
        }
    }
}
