// HTTP error taxonomy
//
// Adapters keep their own error enums; handlers convert them into AppError,
// which serializes as {"error": ...} with the matching status code. Missing
// input is always a 400, never a 500.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::embedding::EmbeddingError;
use crate::llm_engine::provider::LlmError;

#[derive(Debug)]
pub enum AppError {
    /// A required request field is absent or empty
    MissingInput(String),
    /// The uploaded audio could not be decoded
    MalformedAudio(String),
    /// No speech was recognized in the upload
    EmptyTranscript,
    /// A model collaborator cannot be reached or has no model loaded
    ModelUnavailable(String),
    /// Inference or post-processing failed
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingInput(_) => StatusCode::BAD_REQUEST,
            AppError::MalformedAudio(_) => StatusCode::BAD_REQUEST,
            AppError::EmptyTranscript => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingInput(msg) => write!(f, "{}", msg),
            AppError::MalformedAudio(msg) => write!(f, "Could not decode audio: {}", msg),
            AppError::EmptyTranscript => write!(f, "No speech recognized in the uploaded audio"),
            AppError::ModelUnavailable(msg) => write!(f, "Model unavailable: {}", msg),
            AppError::Internal(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::ProviderUnavailable(msg) | LlmError::ModelNotFound(msg) => {
                AppError::ModelUnavailable(msg)
            }
            LlmError::NotInitialized => {
                AppError::ModelUnavailable("LLM provider not initialized".to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<EmbeddingError> for AppError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::ProviderUnavailable(msg) => AppError::ModelUnavailable(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed ({}): {}", status, self);
        } else {
            log::warn!("Request rejected ({}): {}", status, self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_is_client_error() {
        let err = AppError::MissingInput("No prompt provided".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "No prompt provided");
    }

    #[test]
    fn test_llm_unavailable_maps_to_503() {
        let err: AppError = LlmError::ProviderUnavailable("Ollama down".to_string()).into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_request_failure_maps_to_500() {
        let err: AppError = LlmError::RequestFailed("timeout".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
