use arena_common::{StoreError, ValidationError};
use arena_judge::JudgeError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

/// Why an authoring or catalog request did not go through.
#[derive(Debug, Error)]
pub enum AuthoringError {
    #[error("{0}")]
    MalformedPayload(String),

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("problem validation could not be completed: {0}")]
    JudgeTransport(String),

    #[error("judge did not finish in time: {0}")]
    JudgeTimeout(String),

    #[error("{0}")]
    JudgeValidationFailed(String),

    #[error("problem {0} not found")]
    NotFound(String),

    #[error("invalid problem id: {0}")]
    InvalidIdentifier(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl AuthoringError {
    /// Metric label for this outcome
    pub fn kind(&self) -> &'static str {
        match self {
            AuthoringError::MalformedPayload(_) => "malformed_payload",
            AuthoringError::UnsupportedLanguage(_) => "unsupported_language",
            AuthoringError::JudgeTransport(_) => "judge_transport",
            AuthoringError::JudgeTimeout(_) => "judge_timeout",
            AuthoringError::JudgeValidationFailed(_) => "judge_rejected",
            AuthoringError::NotFound(_) => "not_found",
            AuthoringError::InvalidIdentifier(_) => "invalid_identifier",
            AuthoringError::Store(_) => "store",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AuthoringError::MalformedPayload(_)
            | AuthoringError::UnsupportedLanguage(_)
            | AuthoringError::InvalidIdentifier(_)
            | AuthoringError::JudgeValidationFailed(_) => StatusCode::BAD_REQUEST,
            AuthoringError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthoringError::JudgeTransport(_) => StatusCode::BAD_GATEWAY,
            AuthoringError::JudgeTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AuthoringError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for AuthoringError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Malformed(message) => AuthoringError::MalformedPayload(message),
            ValidationError::UnsupportedLanguage(name) => AuthoringError::UnsupportedLanguage(name),
        }
    }
}

impl From<JudgeError> for AuthoringError {
    fn from(err: JudgeError) -> Self {
        match err {
            JudgeError::UnsupportedLanguage(name) => AuthoringError::UnsupportedLanguage(name),
            JudgeError::Timeout { .. } => AuthoringError::JudgeTimeout(err.to_string()),
            JudgeError::Transport { .. }
            | JudgeError::BadResponse { .. }
            | JudgeError::LanguageTable(_)
            | JudgeError::Config(_) => AuthoringError::JudgeTransport(err.to_string()),
        }
    }
}

impl IntoResponse for AuthoringError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), error = %self, "Request failed");
        }

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
