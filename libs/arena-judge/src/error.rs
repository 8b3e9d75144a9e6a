use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("judge request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("unexpected judge response from {endpoint}: {message}")]
    BadResponse { endpoint: String, message: String },

    #[error("judge left {pending} of {total} submissions unfinished after {waited:?}")]
    Timeout {
        pending: usize,
        total: usize,
        waited: Duration,
    },

    #[error("invalid language table: {0}")]
    LanguageTable(String),

    #[error("invalid judge configuration: {0}")]
    Config(String),
}

impl JudgeError {
    pub(crate) fn bad_response(endpoint: &str, message: impl Into<String>) -> Self {
        JudgeError::BadResponse {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }
}
