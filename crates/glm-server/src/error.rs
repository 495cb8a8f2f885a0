//! HTTP error handling and response mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use glm_engine::EngineError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A model or tokenizer that was never loaded for this process.
    #[error("{0}")]
    ServiceUnavailable(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ServerError::Engine(EngineError::Tokenization(msg)) => {
                (StatusCode::BAD_REQUEST, "invalid_request_error", msg)
            }
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request_error", msg)
            }
            ServerError::ServiceUnavailable(msg) => {
                (StatusCode::NOT_FOUND, "not_found_error", msg)
            }
            ServerError::Engine(err) => {
                tracing::error!(error = %err, "engine failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "server_error",
                    err.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": message,
                "type": error_type,
                "param": null,
                "code": null,
            }
        }));

        (status, body).into_response()
    }
}
